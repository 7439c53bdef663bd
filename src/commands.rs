use crate::grid::{self, DAY_NAMES};
use crate::ui;
use anyhow::{Context, Result};
use chrono::{Datelike, Local};

pub fn show(month: Option<String>) -> Result<()> {
    let anchor = match month {
        Some(text) => grid::parse_month(&text).context("parsing --month")?,
        None => Local::now().date_naive(),
    };
    println!("{}", grid::month_label(anchor));
    let header = DAY_NAMES
        .iter()
        .map(|name| format!("{:>4}", name))
        .collect::<String>();
    println!("{}", header);
    for row in grid::month_cells(anchor) {
        let mut line = String::new();
        for cell in row {
            match cell.date() {
                Some(date) => line.push_str(&format!("{:>4}", date.day())),
                None => line.push_str("    "),
            }
        }
        println!("{}", line);
    }
    Ok(())
}

pub fn tui() -> Result<()> {
    ui::run(Local::now().date_naive())
}
