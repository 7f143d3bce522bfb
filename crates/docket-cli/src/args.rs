use std::path::PathBuf;

use chrono::{Days, NaiveDate};
use clap::Parser;
use docket_core::{CaseQuery, CauseListSelection, CoreError};

const EXAMPLES: &str = "\
Examples:
  # Check if a case is listed today using its CNR
  docket --today MHAU030151912016

  # Check tomorrow using case type, number, and year
  docket --tomorrow MHAU03 0151912 2016

  # Pick a cause list by hand in the browser
  docket --causelist

  # Fill the cause-list form automatically
  docket --causelist --state Maharashtra --district Mumbai --court \"City Civil Court\"";

/// Docket -- fetch eCourts case details and cause lists as JSON and PDF.
#[derive(Parser, Debug)]
#[command(name = "docket", version, about, after_help = EXAMPLES)]
pub struct Cli {
    /// Check whether the case is listed today
    #[arg(long, conflicts_with = "tomorrow")]
    pub today: bool,

    /// Check whether the case is listed tomorrow
    #[arg(long)]
    pub tomorrow: bool,

    /// Capture a cause list instead of looking up a case
    #[arg(long, conflicts_with_all = ["today", "tomorrow", "cnr", "number", "year"])]
    pub causelist: bool,

    /// State for the cause list (visible dropdown text)
    #[arg(long, requires = "causelist")]
    pub state: Option<String>,

    /// District for the cause list
    #[arg(long, requires = "causelist")]
    pub district: Option<String>,

    /// Court complex for the cause list
    #[arg(long, requires = "causelist")]
    pub court: Option<String>,

    /// Cause-list date as DD-MM-YYYY (defaults to today)
    #[arg(long, requires = "causelist")]
    pub date: Option<String>,

    /// Full 16-character CNR, or the case type when number and year follow
    pub cnr: Option<String>,

    /// Case number
    pub number: Option<String>,

    /// Registration year
    pub year: Option<String>,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, env = "DOCKET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Directory for PDF and JSON output
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Wait for Enter before closing the browser
    #[arg(long)]
    pub keep_open: bool,

    /// Write the effective configuration to the user config file and exit
    #[arg(long, conflicts_with_all = ["causelist", "cnr"])]
    pub save_config: bool,
}

/// Which date a listing check is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateCheck {
    Today,
    Tomorrow,
}

impl DateCheck {
    pub fn label(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
        }
    }

    pub fn date(self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::Today => today,
            Self::Tomorrow => today.checked_add_days(Days::new(1)).unwrap_or(today),
        }
    }
}

/// What a run does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Case {
        query: CaseQuery,
        check: Option<DateCheck>,
    },
    CauseList {
        selection: Option<CauseListSelection>,
    },
}

impl Cli {
    /// Validate the argument combination.
    pub fn mode(&self) -> Result<Mode, CoreError> {
        if self.causelist {
            let selection = match (&self.state, &self.district, &self.court) {
                (Some(state), Some(district), Some(court)) => Some(CauseListSelection {
                    state: state.clone(),
                    district: district.clone(),
                    court_complex: court.clone(),
                    date: self.date.clone(),
                }),
                (None, None, None) if self.date.is_none() => None,
                _ => {
                    return Err(CoreError::Validation(
                        "--state, --district, and --court must be given together".to_string(),
                    ))
                }
            };
            return Ok(Mode::CauseList { selection });
        }

        let first = self.cnr.as_deref().ok_or_else(|| {
            CoreError::Validation(
                "provide either a full 16-character CNR (e.g. MHAU030151912016) \
                 or case type, number, and year (e.g. MHAU03 0151912 2016)"
                    .to_string(),
            )
        })?;
        let query = CaseQuery::from_tokens(first, self.number.as_deref(), self.year.as_deref())?;

        let check = if self.today {
            Some(DateCheck::Today)
        } else if self.tomorrow {
            Some(DateCheck::Tomorrow)
        } else {
            None
        };

        Ok(Mode::Case { query, check })
    }
}
