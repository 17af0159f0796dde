//! Interactive prompt loop.
//!
//! Asks for a city and an optional month/day filter, prints the statistics,
//! offers to page through the matching raw records, then offers a restart.
//! Answers come from the terminal, or line by line when stdin is piped.

use std::io::{BufRead, ErrorKind, IsTerminal, Write};

use anyhow::Result;
use bikeshare_stats::filter::{MONTHS, weekday_name};
use bikeshare_stats::paginate::Paginator;
use bikeshare_stats::{City, DayFilter, FilterSpec, Loader, MonthFilter, output};
use dialoguer::{Confirm, Input, Select};
use tracing::info;

use crate::analyze;

/// How the user wants to narrow the trips by time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Month,
    Day,
    Both,
    None,
}

impl FilterKind {
    pub const ALL: [FilterKind; 4] = [
        FilterKind::Month,
        FilterKind::Day,
        FilterKind::Both,
        FilterKind::None,
    ];

    fn label(self) -> &'static str {
        match self {
            FilterKind::Month => "Month",
            FilterKind::Day => "Day",
            FilterKind::Both => "Both",
            FilterKind::None => "None (no time filter)",
        }
    }

    fn wants_month(self) -> bool {
        matches!(self, FilterKind::Month | FilterKind::Both)
    }

    fn wants_day(self) -> bool {
        matches!(self, FilterKind::Day | FilterKind::Both)
    }
}

/// Source of answers for the prompt loop.
///
/// Every method returns `Ok(None)` once input has ended.
pub trait Prompter {
    /// Free text, re-asked until `validate` accepts it.
    fn text(
        &mut self,
        prompt: &str,
        validate: &dyn Fn(&str) -> std::result::Result<(), String>,
    ) -> Result<Option<String>>;

    /// Index of one of `items`.
    fn select(&mut self, prompt: &str, items: &[&str], default: usize) -> Result<Option<usize>>;

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<Option<bool>>;
}

/// Terminal prompts drawn with `dialoguer`.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn text(
        &mut self,
        prompt: &str,
        validate: &dyn Fn(&str) -> std::result::Result<(), String>,
    ) -> Result<Option<String>> {
        until_end_of_input(
            Input::<String>::new()
                .with_prompt(prompt)
                .validate_with(|input: &String| validate(input.as_str()))
                .interact_text(),
        )
    }

    fn select(&mut self, prompt: &str, items: &[&str], default: usize) -> Result<Option<usize>> {
        until_end_of_input(
            Select::new()
                .with_prompt(prompt)
                .items(items)
                .default(default)
                .interact(),
        )
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<Option<bool>> {
        until_end_of_input(Confirm::new().with_prompt(prompt).default(default).interact())
    }
}

fn until_end_of_input<T>(result: dialoguer::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(dialoguer::Error::IO(e))
            if matches!(e.kind(), ErrorKind::NotConnected | ErrorKind::UnexpectedEof) =>
        {
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Line-oriented prompts for piped or scripted input.
///
/// Choices are answered with the first word of an item (case-insensitive) or
/// its 1-based number. Confirmations take yes/y/no/n, blank meaning the default.
pub struct LinePrompter<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.out, "{prompt} ")?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.out)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn text(
        &mut self,
        prompt: &str,
        validate: &dyn Fn(&str) -> std::result::Result<(), String>,
    ) -> Result<Option<String>> {
        while let Some(answer) = self.ask(prompt)? {
            match validate(&answer) {
                Ok(()) => return Ok(Some(answer)),
                Err(msg) => writeln!(self.out, "{msg}")?,
            }
        }
        Ok(None)
    }

    fn select(&mut self, prompt: &str, items: &[&str], _default: usize) -> Result<Option<usize>> {
        let choices = items.iter().map(|i| choice_word(i)).collect::<Vec<_>>().join("/");
        let prompt = format!("{prompt} ({choices})");
        while let Some(answer) = self.ask(&prompt)? {
            match choice_index(items, &answer) {
                Some(index) => return Ok(Some(index)),
                None => writeln!(self.out, "Please choose one of: {choices}")?,
            }
        }
        Ok(None)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<Option<bool>> {
        let prompt = format!("{prompt} [{}]", if default { "Y/n" } else { "y/N" });
        while let Some(answer) = self.ask(&prompt)? {
            match answer.to_ascii_lowercase().as_str() {
                "" => return Ok(Some(default)),
                "y" | "yes" => return Ok(Some(true)),
                "n" | "no" => return Ok(Some(false)),
                _ => writeln!(self.out, "Please answer yes or no.")?,
            }
        }
        Ok(None)
    }
}

fn choice_word(item: &str) -> &str {
    item.split_whitespace().next().unwrap_or(item)
}

fn choice_index(items: &[&str], answer: &str) -> Option<usize> {
    if let Ok(n) = answer.parse::<usize>() {
        return (1..=items.len()).contains(&n).then(|| n - 1);
    }
    items
        .iter()
        .position(|item| choice_word(item).eq_ignore_ascii_case(answer))
}

/// Runs the prompt loop on the terminal, or line by line when stdin is piped.
///
/// # Errors
///
/// Returns an error if a prompt fails or a trip source cannot be loaded.
pub fn run(loader: &Loader) -> Result<()> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        run_session(loader, &mut TerminalPrompter, std::io::stdout())
    } else {
        info!("Standard input is not a terminal, reading answers line by line");
        let mut prompter = LinePrompter::new(stdin.lock(), std::io::stdout());
        run_session(loader, &mut prompter, std::io::stdout())
    }
}

/// Prompt loop until the user declines to restart or input ends.
pub fn run_session<P: Prompter + ?Sized, W: Write>(
    loader: &Loader,
    prompter: &mut P,
    mut out: W,
) -> Result<()> {
    loop {
        let Some(spec) = select_filter(prompter, &mut out)? else {
            info!("End of input, exiting");
            return Ok(());
        };
        info!(spec = %spec, "Filter selected");

        let (set, report) = analyze(loader, &spec)?;

        writeln!(out)?;
        output::write_report(&mut out, &report)?;
        writeln!(out)?;

        // Paging always starts from the first page of this run's records.
        let mut pager = Paginator::new(set.records());
        loop {
            match prompter.confirm("Would you like to view individual trip data?", false)? {
                Some(true) => {}
                Some(false) => break,
                None => {
                    info!("End of input, exiting");
                    return Ok(());
                }
            }
            if !pager.has_more() {
                writeln!(out, "No more trip data to display.")?;
                break;
            }
            output::write_page(&mut out, spec.city.schema(), pager.next_page())?;
        }

        if prompter.confirm("Would you like to restart?", false)? != Some(true) {
            return Ok(());
        }
    }
}

/// Prompts for a city, then for the month and/or day filter.
fn select_filter<P: Prompter + ?Sized, W: Write>(
    prompter: &mut P,
    out: &mut W,
) -> Result<Option<FilterSpec>> {
    let Some(city) = prompter.text(
        "Would you like to see data for Chicago, New York, or Washington?",
        &|input: &str| input.parse::<City>().map(|_| ()).map_err(|e| e.to_string()),
    )?
    else {
        return Ok(None);
    };
    let city: City = city.parse()?;
    writeln!(out, "Ok, we will explore the data for: {city}")?;

    let labels: Vec<_> = FilterKind::ALL.iter().map(|k| k.label()).collect();
    let Some(kind) = prompter.select(
        "Would you like to filter the data by month, day, both, or not at all?",
        &labels,
        3,
    )?
    else {
        return Ok(None);
    };
    let kind = FilterKind::ALL[kind];

    let month = if kind.wants_month() {
        let names: Vec<_> = MONTHS.iter().map(|m| m.name()).collect();
        let Some(index) = prompter.select("Which month?", &names, 0)? else {
            return Ok(None);
        };
        MonthFilter::Only(MONTHS[index])
    } else {
        MonthFilter::All
    };

    let day = if kind.wants_day() {
        let Some(day) = prompter.text(
            "Which day? Please type your response as an integer (e.g., 1=Sunday)",
            &|input: &str| parse_day_number(input).map(|_| ()),
        )?
        else {
            return Ok(None);
        };
        parse_day_number(&day).map_err(anyhow::Error::msg)?
    } else {
        DayFilter::All
    };

    let spec = FilterSpec::new(city).with_month(month).with_day(day);
    writeln!(out, "{}", describe(&spec))?;
    Ok(Some(spec))
}

/// Parses a 1-7 day number, 1 being Sunday.
fn parse_day_number(input: &str) -> std::result::Result<DayFilter, String> {
    let n: u32 = input
        .trim()
        .parse()
        .map_err(|_| "Invalid input. Please enter an integer value (1-7).".to_string())?;
    DayFilter::from_number(n).ok_or_else(|| "Invalid day. Please choose a valid day.".to_string())
}

fn describe(spec: &FilterSpec) -> String {
    match (spec.month, spec.day) {
        (MonthFilter::All, DayFilter::All) => "No time filter will be applied.".to_string(),
        (MonthFilter::Only(m), DayFilter::All) => format!("Ok, we will explore the data for {}", m.name()),
        (MonthFilter::All, DayFilter::Only(d)) => {
            format!("Ok, we will filter data by {}s", weekday_name(d))
        }
        (MonthFilter::Only(m), DayFilter::Only(d)) => format!(
            "Ok, we will filter data by {} and {}s",
            m.name(),
            weekday_name(d)
        ),
    }
}
