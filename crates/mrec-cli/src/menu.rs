//! Interactive numbered menu
//!
//! Loads the data file on entry and saves it when the user exits or input
//! ends. Store errors are reported and the loop keeps going.

use crate::commands::{Context, render_table};
use anyhow::{Context as _, Result};
use colored::Colorize;
use mrec_core::Store;
use mrec_core::config::DisplayConfig;
use std::io::{BufRead, Write};
use std::str::FromStr;

const MENU: &str = "\
1. Create record
2. List records
3. Update record
4. Delete record
5. Delete all records
6. Exit";

/// Outcome of one prompt
enum Answer<T> {
    Value(T),
    Invalid,
    Eof,
}

/// Unwrap an `Answer::Value` or return the other outcome from the caller
macro_rules! answer {
    ($e:expr) => {
        match $e {
            Answer::Value(v) => v,
            Answer::Invalid => return Ok(Answer::Invalid),
            Answer::Eof => return Ok(Answer::Eof),
        }
    };
}

/// Run the menu against `ctx.data_file`
pub fn interactive<R: BufRead, W: Write>(ctx: &Context, input: R, mut output: W) -> Result<()> {
    let mut store = ctx
        .open_store()
        .with_context(|| format!("Failed to load records from {}", ctx.data_file.display()))?;

    Menu {
        store: &mut store,
        display: &ctx.config.display,
        input,
        output: &mut output,
    }
    .run()?;

    store
        .save(&ctx.data_file)
        .with_context(|| format!("Failed to save records to {}", ctx.data_file.display()))?;
    writeln!(output, "Saved {} record(s). Exiting...", store.len())?;
    Ok(())
}

struct Menu<'a, R, W> {
    store: &'a mut Store,
    display: &'a DisplayConfig,
    input: R,
    output: &'a mut W,
}

impl<R: BufRead, W: Write> Menu<'_, R, W> {
    fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "{}", MENU)?;
            let choice = match self.ask::<u32>("Select an option: ")? {
                Answer::Value(choice) => choice,
                Answer::Invalid => continue,
                Answer::Eof => return Ok(()),
            };

            let outcome = match choice {
                1 => self.create()?,
                2 => self.list()?,
                3 => self.update()?,
                4 => self.delete()?,
                5 => self.delete_all()?,
                6 => return Ok(()),
                _ => {
                    writeln!(self.output, "{} Invalid option", "!".yellow())?;
                    Answer::Invalid
                }
            };

            if let Answer::Eof = outcome {
                return Ok(());
            }
        }
    }

    /// Prompt for one line; `None` at end of input
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompt and parse, reporting values that do not parse
    fn ask<T: FromStr>(&mut self, label: &str) -> Result<Answer<T>> {
        let Some(line) = self.prompt(label)? else {
            return Ok(Answer::Eof);
        };
        match line.parse() {
            Ok(value) => Ok(Answer::Value(value)),
            Err(_) => {
                writeln!(self.output, "{} Invalid value: {:?}", "!".yellow(), line)?;
                Ok(Answer::Invalid)
            }
        }
    }

    fn ask_fields(&mut self, qualifier: &str) -> Result<Answer<(String, f64, String)>> {
        let source = answer!(self.ask::<String>(&format!("Enter {}source: ", qualifier))?);
        let measurement = answer!(self.ask::<f64>(&format!("Enter {}measurement: ", qualifier))?);
        let event = answer!(self.ask::<String>(&format!("Enter {}event: ", qualifier))?);
        Ok(Answer::Value((source, measurement, event)))
    }

    fn create(&mut self) -> Result<Answer<()>> {
        let (source, measurement, event) = answer!(self.ask_fields("")?);
        let id = self.store.create(source, measurement, event).id;
        writeln!(self.output, "{} Created record {}", "✓".green(), id)?;
        Ok(Answer::Value(()))
    }

    fn list(&mut self) -> Result<Answer<()>> {
        if self.store.is_empty() {
            writeln!(self.output, "No records found")?;
        } else {
            writeln!(self.output, "{}", render_table(self.store.list(), self.display))?;
        }
        Ok(Answer::Value(()))
    }

    fn update(&mut self) -> Result<Answer<()>> {
        let id = answer!(self.ask::<u64>("Enter the ID of the record to update: ")?);
        let (source, measurement, event) = answer!(self.ask_fields("new ")?);
        match self.store.update(id, source, measurement, event) {
            Ok(_) => writeln!(self.output, "{} Updated record {}", "✓".green(), id)?,
            Err(e) => writeln!(self.output, "{} {}", "✗".red(), e)?,
        }
        Ok(Answer::Value(()))
    }

    fn delete(&mut self) -> Result<Answer<()>> {
        let id = answer!(self.ask::<u64>("Enter the ID of the record to delete: ")?);
        match self.store.delete(id) {
            Ok(_) => writeln!(self.output, "{} Deleted record {}", "✓".green(), id)?,
            Err(e) => writeln!(self.output, "{} {}", "✗".red(), e)?,
        }
        Ok(Answer::Value(()))
    }

    fn delete_all(&mut self) -> Result<Answer<()>> {
        self.store.delete_all();
        writeln!(self.output, "{} All records deleted", "✓".green())?;
        Ok(Answer::Value(()))
    }
}
