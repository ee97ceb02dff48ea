//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::api::{Container, Unit};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of systemd units (services or sockets).
pub fn print_units_table(kind: &str, units: &[Unit]) {
    if units.is_empty() {
        info(&format!("No {kind} reported by the server."));
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Unit", "Load", "Active", "Sub", "Description"]);

    for u in units {
        table.add_row(vec![
            u.unit.as_str(),
            u.load.as_str(),
            u.active.as_str(),
            u.sub.as_str(),
            u.description.as_str(),
        ]);
    }

    println!("{table}");
}

/// Print a table of running containers.
pub fn print_containers_table(containers: &[Container]) {
    if containers.is_empty() {
        info("No running containers.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "ID", "Image", "Command", "Created", "Status", "Ports", "Names",
    ]);

    for c in containers {
        table.add_row(vec![
            c.id.as_str(),
            c.image.as_str(),
            c.command.as_str(),
            c.created.as_str(),
            c.status.as_str(),
            c.ports.as_str(),
            c.names.as_str(),
        ]);
    }

    println!("{table}");
}
