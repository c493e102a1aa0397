//! Welcome banner display for chat sessions.

use std::io::{self, Write};

use console::style;

/// Print the welcome banner before the first prompt: the assistant label,
/// the model, the endpoint and how to leave.
pub fn print_welcome_banner<W: Write>(
    out: &mut W,
    assistant_name: &str,
    model: &str,
    base_url: &str,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  * {}", style(assistant_name).cyan().bold())?;
    writeln!(out)?;
    writeln!(out, "  {}  {}", style("Model:").bold(), style(model).dim())?;
    writeln!(out, "  {}  {}", style("Endpoint:").bold(), style(base_url).dim())?;
    writeln!(out)?;
    writeln!(
        out,
        "  {}",
        style("Type 'exit' or press Ctrl+D to quit").dim()
    )?;
    writeln!(out, "  {}", style("---").dim())?;
    writeln!(out)?;
    Ok(())
}
