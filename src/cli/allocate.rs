use super::ui;
use crate::core::{AllocationEngine, PortfolioReport};
use crate::core::request::handle_allocation_request;
use anyhow::{Context, Result};
use comfy_table::{Cell, CellAlignment};

impl PortfolioReport {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Symbol"),
            ui::header_cell("Shares"),
            ui::header_cell("Price"),
            ui::header_cell("Invested"),
            ui::header_cell("Prev Close"),
            ui::header_cell("Change"),
            ui::header_cell("Change (%)"),
        ]);

        for allocation in &self.allocations {
            table.add_row(vec![
                Cell::new(&allocation.symbol),
                Cell::new(allocation.shares).set_alignment(CellAlignment::Right),
                ui::money_cell(allocation.current_price),
                ui::money_cell(allocation.allocated_amount),
                ui::money_cell(allocation.previous_close),
                ui::change_cell(
                    ui::format_money(allocation.value_change),
                    allocation.value_change,
                ),
                ui::change_cell(
                    format!("{:.2}%", allocation.percentage_change.round_dp(2)),
                    allocation.percentage_change,
                ),
            ]);
        }

        let mut output = format!(
            "Strategy: {}\n{}\n\n",
            ui::style_text(self.strategy.as_str(), ui::StyleType::Title),
            ui::style_text(&self.description, ui::StyleType::Subtle)
        );
        output.push_str(&format!(
            "Investing {} ({} per security)\n\n",
            ui::format_money(self.amount),
            ui::format_money(self.amount_per_security)
        ));
        output.push_str(&table.to_string());

        output.push_str(&format!(
            "\n\n{}: {}",
            ui::style_text("Current Value", ui::StyleType::TotalLabel),
            ui::style_text(
                &ui::format_money(self.current_value),
                ui::StyleType::TotalValue
            )
        ));
        let change_style = if self.total_value_change.is_sign_negative()
            && !self.total_value_change.is_zero()
        {
            ui::StyleType::Error
        } else {
            ui::StyleType::TotalValue
        };
        output.push_str(&format!(
            "\n{}: {}",
            ui::style_text("Change Since Previous Close", ui::StyleType::TotalLabel),
            ui::style_text(&ui::format_money(self.total_value_change), change_style)
        ));
        output.push_str(&format!(
            "\n{}: {}",
            ui::style_text("Uninvested Cash", ui::StyleType::TotalLabel),
            ui::format_money(self.uninvested)
        ));

        if !self.trend.is_empty() {
            let mut trend_table = ui::new_styled_table();
            trend_table.set_header(vec![ui::header_cell("Date"), ui::header_cell("Value")]);
            for point in &self.trend {
                trend_table.add_row(vec![
                    Cell::new(point.date.format("%Y-%m-%d")),
                    ui::money_cell(point.value),
                ]);
            }
            output.push_str(&format!(
                "\n\n{}\n{}",
                ui::style_text("Portfolio Trend", ui::StyleType::Title),
                trend_table
            ));
        }

        output
    }
}

pub async fn run(
    engine: &AllocationEngine,
    amount: &str,
    strategy: &str,
    json: bool,
) -> Result<()> {
    let pb = ui::new_spinner("Fetching market data...");
    let result = handle_allocation_request(engine, amount, strategy).await;
    pb.finish_and_clear();

    let report = result?;
    if json {
        let body =
            serde_json::to_string_pretty(&report).context("Failed to serialize allocation")?;
        println!("{body}");
    } else {
        println!("{}", report.display_as_table());
    }
    Ok(())
}
