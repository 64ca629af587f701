//! The `operators_info` module provides code to output the list of supported mutation operators
//! and descriptions of the supported operators.

use crate::OperatorsCLArgs;
use bytemut_lib::mutation::{all_operator_descriptions, OperatorType};
use std::io::{stdout, Write};

/// Simple struct for keeping track of the width of the operator name and the width of the
/// terminal.
struct ColumnSizes {
    /// Length of the longest operator name.
    name_width: usize,

    /// Number of columns available for output.
    line_width: usize,
}

/// Function that displays either/or the mutation operator documentation.
pub fn display_operators_info(params: OperatorsCLArgs) {
    let mut stream = stdout();

    if params.list {
        let _ = write_operator_list(&mut stream, get_terminal_size().cols as usize);
        return;
    }

    if params.describe {
        let _ = write_operator_descriptions(&mut stream, get_terminal_size().cols as usize);
    }
}

fn get_terminal_size() -> termsize::Size {
    if let Some(size) = termsize::get() {
        size
    } else {
        // Not attached to a terminal, for example when run from a script.
        termsize::Size { rows: 50, cols: 80 }
    }
}

/// Return the operator types sorted by name together with the column sizes for `line_width`.
fn sorted_operators(line_width: usize) -> (Vec<OperatorType>, ColumnSizes) {
    let mut operators: Vec<OperatorType> = all_operator_descriptions().keys().copied().collect();
    operators.sort_unstable_by_key(|a| a.to_string());

    let name_width = operators
        .iter()
        .map(|o| o.to_string().len())
        .max()
        .unwrap_or(0);

    (
        operators,
        ColumnSizes {
            name_width,
            line_width,
        },
    )
}

/// Write the operator names and the summary of each operator to `stream`.
///
/// # Arguments
///
/// * `stream` - The [`Write`] object that will receive the text.
/// * `line_width` - The number of columns available.
fn write_operator_list<W: Write>(stream: &mut W, line_width: usize) -> std::io::Result<()> {
    let descriptions = all_operator_descriptions();
    let (operators, column_sizes) = sorted_operators(line_width);

    for (i, operator) in operators.iter().enumerate() {
        let name = operator.to_string();
        write!(stream, "{:width$} ", name, width = column_sizes.name_width)?;
        write_flowable_text(
            stream,
            descriptions[operator].summary,
            column_sizes.name_width + 1,
            &column_sizes,
        )?;

        if i < operators.len() - 1 {
            writeln!(stream)?;
        }
    }

    Ok(())
}

/// Write the detailed description of each operator to `stream`.
///
/// # Arguments
///
/// * `stream` - The [`Write`] object that will receive the text.
/// * `line_width` - The number of columns available.
fn write_operator_descriptions<W: Write>(stream: &mut W, line_width: usize) -> std::io::Result<()> {
    let descriptions = all_operator_descriptions();
    let (operators, column_sizes) = sorted_operators(line_width);
    let indent = column_sizes.name_width + 1;

    for (i, operator) in operators.iter().enumerate() {
        let description = &descriptions[operator];
        let name = operator.to_string();

        write!(stream, "{:width$} ", name, width = column_sizes.name_width)?;
        write_flowable_text(stream, description.summary, indent, &column_sizes)?;

        if !description.extra_details.is_empty() {
            writeln!(stream)?;
            write!(stream, "{:indent$}", "", indent = indent)?;
            write_flowable_text(stream, description.extra_details, indent, &column_sizes)?;
        }

        if !description.operations.is_empty() {
            let operations = format!("{:?}", description.operations);
            write_category(stream, "Operations:", &operations, indent, &column_sizes)?;
        }

        if !description.examples.is_empty() {
            write_category(
                stream,
                "Examples:",
                description.examples,
                indent,
                &column_sizes,
            )?;
        }

        if i < operators.len() - 1 {
            writeln!(stream)?;
            writeln!(stream)?;
        }
    }

    Ok(())
}

/// Write a headed section of an operator description.
///
/// # Arguments
///
/// * `stream` - The [`Write`] object that will receive the text.
/// * `heading` - The category heading.
/// * `text` - The content of the category.
/// * `indent` - The column at which the section starts.
/// * `column_sizes` - The widths used for formatting.
fn write_category<W: Write>(
    stream: &mut W,
    heading: &str,
    text: &str,
    indent: usize,
    column_sizes: &ColumnSizes,
) -> std::io::Result<()> {
    writeln!(stream)?;
    writeln!(stream)?;
    writeln!(stream, "{:indent$}{}", "", heading, indent = indent)?;
    writeln!(
        stream,
        "{:indent$}{}",
        "",
        "-".repeat(heading.len()),
        indent = indent
    )?;
    write!(stream, "{:indent$}", "", indent = indent + 1)?;
    write_flowable_text(stream, text, indent + 1, column_sizes)
}

/// Write `text` word by word, starting new lines indented by `indent` whenever the next word
/// would pass the line width.  The caller has already written `indent` columns on the current
/// line.
fn write_flowable_text<W: Write>(
    stream: &mut W,
    text: &str,
    indent: usize,
    column_sizes: &ColumnSizes,
) -> std::io::Result<()> {
    let mut column = indent;

    for (i, word) in text.split_whitespace().enumerate() {
        let word_width = word.chars().count();

        if i > 0 {
            if column + 1 + word_width > column_sizes.line_width {
                writeln!(stream)?;
                write!(stream, "{:indent$}", "", indent = indent)?;
                column = indent;
            } else {
                write!(stream, " ")?;
                column += 1;
            }
        }

        write!(stream, "{}", word)?;
        column += word_width;
    }

    writeln!(stream)
}
