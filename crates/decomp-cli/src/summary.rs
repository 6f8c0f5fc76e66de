use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use decomp_model::PeriodicTable;

use decomp_cli::report::{Candidate, QueryResult};

/// One table per query mass.
pub fn print_results(results: &[QueryResult], with_errors: bool) {
    for (index, result) in results.iter().enumerate() {
        if index > 0 {
            println!();
        }
        println!(
            "Mass {} {} -> neutral {:.6}",
            result.query, result.ion, result.neutral_mass
        );
        if result.candidates.is_empty() {
            println!("No formulas found.");
            continue;
        }
        println!("{}", candidate_table(&result.candidates, with_errors));
    }
}

fn candidate_table(candidates: &[Candidate], with_errors: bool) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("Formula"), header_cell("Mass")];
    if with_errors {
        header.push(header_cell("Error (mDa)"));
        header.push(header_cell("Error (ppm)"));
    }
    header.push(header_cell("RDBE"));
    table.set_header(header);
    apply_table_style(&mut table);
    for column in 1..table.column_count() {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for candidate in candidates {
        let mut row = vec![
            Cell::new(&candidate.formula)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(format!("{:.6}", candidate.mass)),
        ];
        if with_errors {
            row.push(Cell::new(format!("{:.3}", candidate.error * 1e3)));
            row.push(Cell::new(format!("{:.2}", candidate.ppm)));
        }
        row.push(rdbe_cell(candidate.rdbe));
        table.add_row(row);
    }
    table
}

pub fn print_elements(periodic: &PeriodicTable) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Symbol"),
        header_cell("Name"),
        header_cell("Mass"),
        header_cell("Valence"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for element in periodic.iter() {
        table.add_row(vec![
            Cell::new(element.symbol())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(element.name()),
            Cell::new(format!("{:.8}", element.mass())),
            Cell::new(element.valence()),
        ]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn rdbe_cell(rdbe: f64) -> Cell {
    let text = format!("{rdbe:.1}");
    if rdbe < 0.0 {
        Cell::new(text).fg(Color::Yellow)
    } else if rdbe == 0.0 {
        dim_cell(text)
    } else {
        Cell::new(text)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
