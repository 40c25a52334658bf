use anyhow::{Context, Result};
use clap::Parser;
use ednkit::{Reader, Value, Writer};
use std::io::{self, BufWriter, Write};

mod cli;
mod input;

use cli::Args;
use input::collect_sources;

fn main() -> Result<()> {
    let args = Args::parse();
    let sources = collect_sources(&args.inputs, args.recursive)?;

    let mut reader = Reader::with_options(args.reader_options());
    let writer = Writer::with_options(args.writer_options());
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for source in &sources {
        if args.verbose {
            eprintln!("Reading {}", source);
        }
        let text = source.read()?;
        let count = process_input(&mut reader, &writer, &args, &text, &source.to_string(), &mut out)?;
        if args.verbose {
            eprintln!("{}: {} value(s)", source, count);
        }
    }

    out.flush()?;
    Ok(())
}

/// Read every top-level value of `text` and write it back out canonically,
/// one per line. Returns the number of values read.
fn process_input<W: Write>(
    reader: &mut Reader,
    writer: &Writer,
    args: &Args,
    text: &str,
    name: &str,
    out: &mut W,
) -> Result<usize> {
    reader.set_input(text);
    let mut values = Vec::new();
    let mut count = 0;

    while let Some(value) = reader
        .parse_next_value()
        .with_context(|| format!("failed to parse {}", name))?
    {
        count += 1;
        if args.check {
            continue;
        }
        if args.slurp {
            values.push(value);
        } else {
            print_line(out, args, name, &writer.serialize(&value))?;
        }
    }

    if args.slurp && !args.check {
        print_line(out, args, name, &writer.serialize(&Value::Vector(values)))?;
    }
    Ok(count)
}

fn print_line<W: Write>(out: &mut W, args: &Args, name: &str, line: &str) -> Result<()> {
    if args.with_filename {
        writeln!(out, "{}:{}", name, line)?;
    } else {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(flags: &[&str], text: &str) -> Result<(String, usize)> {
        let args = Args::try_parse_from(std::iter::once("ednkit").chain(flags.iter().copied()))?;
        let mut reader = Reader::with_options(args.reader_options());
        let writer = Writer::with_options(args.writer_options());
        let mut out = Vec::new();
        let count = process_input(&mut reader, &writer, &args, text, "test.edn", &mut out)?;
        Ok((String::from_utf8(out)?, count))
    }

    #[test]
    fn test_canonical_output() {
        let (out, count) = run(&[], "1 \"abc\"\n[1 ,2   3] ; done\n").unwrap();
        assert_eq!(out, "1\n\"abc\"\n[1 2 3]\n");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_slurp() {
        let (out, count) = run(&["-s"], "{:a 1} #_ignored :b").unwrap();
        assert_eq!(out, "[{:a 1} :b]\n");
        assert_eq!(count, 2);

        let (out, _) = run(&["-s"], "").unwrap();
        assert_eq!(out, "[]\n");
    }

    #[test]
    fn test_check_prints_nothing() {
        let (out, count) = run(&["-c"], "(a b) #{1 2}").unwrap();
        assert_eq!(out, "");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_with_filename() {
        let (out, _) = run(&["-H"], ":x :y").unwrap();
        assert_eq!(out, "test.edn::x\ntest.edn::y\n");
    }

    #[test]
    fn test_keyword_options() {
        let (out, _) = run(&["--keywords-as-strings"], "{:name 1}").unwrap();
        assert_eq!(out, "{\"name\" 1}\n");

        let (out, _) = run(&["--keywords-as-strings", "-k"], "{:name 1}").unwrap();
        assert_eq!(out, "{:name 1}\n");
    }

    #[test]
    fn test_parse_error_names_input() {
        let err = run(&[], "[1 2").unwrap_err();
        assert_eq!(err.to_string(), "failed to parse test.edn");
        let cause = err.root_cause().to_string();
        assert!(cause.starts_with("unterminated collection at line 1, column 1"), "{}", cause);
    }

    #[test]
    fn test_max_depth() {
        assert!(run(&["--max-depth", "2"], "[[1]]").is_ok());
        let err = run(&["--max-depth", "2"], "[[[1]]]").unwrap_err();
        assert!(err.root_cause().to_string().starts_with("nesting too deep"));
    }
}
