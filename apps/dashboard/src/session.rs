use crate::render;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tvlens_analysis::chart::{export_chart, render_chart_html};
use tvlens_analysis::timeframe::ParseTimeframeError;
use tvlens_analysis::Timeframe;
use tvlens_shared_models::MergedRow;

const HELP: &str = "\
commands:
  lag <days>      correlate TVL with the price <days> later (e.g. 0, 1, 7, 30)
  range <tf>      1w | 1m | 3m | 6m | ytd | 1y | all
  chart [path]    write the dual-axis chart as HTML
  summary         show the current report again
  reset           back to the starting lag and range
  help            this text
  quit            leave
";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Lag(i64),
    Range(Timeframe),
    Chart(Option<PathBuf>),
    Summary,
    Reset,
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("lag must be a whole number of days, got `{0}`")]
    InvalidLag(String),
    #[error(transparent)]
    Range(#[from] ParseTimeframeError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next();

        match name.as_str() {
            "lag" | "l" => {
                let raw = arg.ok_or(CommandError::MissingArgument("lag"))?;
                let days = raw.trim_end_matches('d');
                days.parse()
                    .map(Command::Lag)
                    .map_err(|_| CommandError::InvalidLag(raw.to_string()))
            }
            "range" | "r" => {
                let raw = arg.ok_or(CommandError::MissingArgument("range"))?;
                Ok(Command::Range(raw.parse()?))
            }
            "chart" | "c" => Ok(Command::Chart(arg.map(PathBuf::from))),
            "summary" | "s" | "" => Ok(Command::Summary),
            "reset" => Ok(Command::Reset),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(name)),
        }
    }
}

/// Interactive view over one loaded series. Reading the data is the caller's
/// job; the session never writes anything except chart files.
pub struct Session {
    rows: Vec<MergedRow>,
    lag_days: i64,
    timeframe: Timeframe,
    chart_path: PathBuf,
    initial: (i64, Timeframe),
}

impl Session {
    pub fn new(rows: Vec<MergedRow>, lag_days: i64, timeframe: Timeframe, chart_path: PathBuf) -> Self {
        Self {
            rows,
            lag_days,
            timeframe,
            chart_path,
            initial: (lag_days, timeframe),
        }
    }

    pub fn report(&self) -> String {
        render::report(&self.rows, self.timeframe, self.lag_days)
    }

    pub fn write_chart(&self, path: Option<PathBuf>) -> Result<PathBuf, tvlens_analysis::AnalysisError> {
        let path = path.unwrap_or_else(|| self.chart_path.clone());
        let title = format!("TVL vs price, lag {}d, range {}", self.lag_days, self.timeframe);
        let html = render_chart_html(&title, &self.rows, self.timeframe)?;
        export_chart(&path, &html)?;
        Ok(path)
    }

    /// Applies one command; returns `false` when the session should end.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<bool> {
        match command {
            Command::Lag(days) => {
                self.lag_days = days;
                write!(out, "{}", self.report())?;
            }
            Command::Range(timeframe) => {
                self.timeframe = timeframe;
                write!(out, "{}", self.report())?;
            }
            Command::Chart(path) => match self.write_chart(path) {
                Ok(path) => writeln!(out, "chart written to {}", path.display())?,
                Err(err) => writeln!(out, "error: {err}")?,
            },
            Command::Summary => write!(out, "{}", self.report())?,
            Command::Reset => {
                (self.lag_days, self.timeframe) = self.initial;
                write!(out, "{}", self.report())?;
            }
            Command::Help => write!(out, "{HELP}")?,
            Command::Quit => return Ok(false),
        }

        Ok(true)
    }

    /// Line-oriented loop until `quit` or end of input. Bad commands print a
    /// message and the loop carries on.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self.report())?;
        writeln!(out, "type `help` for commands")?;

        for line in input.lines() {
            let line = line?;
            let keep_going = match line.parse::<Command>() {
                Ok(command) => self.execute(command, out)?,
                Err(err) => {
                    writeln!(out, "error: {err}")?;
                    true
                }
            };
            if !keep_going {
                break;
            }
            out.flush()?;
        }

        Ok(())
    }
}
