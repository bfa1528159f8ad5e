use super::ui;
use crate::core::StrategyRegistry;
use comfy_table::Cell;

pub fn display_strategies(registry: &StrategyRegistry) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Strategy"),
        ui::header_cell("Tickers"),
        ui::header_cell("Description"),
    ]);

    for strategy in registry.all() {
        table.add_row(vec![
            Cell::new(strategy.name),
            Cell::new(strategy.tickers.join(", ")),
            Cell::new(strategy.description),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Investment Strategies", ui::StyleType::Title),
        table
    )
}

pub fn run() {
    println!("{}", display_strategies(&StrategyRegistry));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_every_strategy() {
        let output = display_strategies(&StrategyRegistry);

        for name in ["ethical", "growth", "index", "quality", "value"] {
            assert!(output.contains(name), "missing {name}");
        }
        assert!(output.contains("BRK-B, INTC, JPM"));
    }
}
