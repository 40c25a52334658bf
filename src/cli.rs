use clap::Parser;
use ednkit::{ReaderOptions, WriterOptions, DEFAULT_MAX_DEPTH};

#[derive(Parser, Debug)]
#[command(name = "ednkit")]
#[command(about = "Validate EDN and print it in canonical form")]
#[command(version)]
pub struct Args {
    /// Input files, glob patterns or directories (reads stdin if none, or for "-")
    pub inputs: Vec<String>,

    /// Search directories for .edn files
    #[arg(short = 'r', long)]
    pub recursive: bool,

    /// Only validate; print nothing on success
    #[arg(short = 'c', long)]
    pub check: bool,

    /// Collect all values of an input into one vector
    #[arg(short = 's', long)]
    pub slurp: bool,

    /// Write string map keys as keywords where possible
    #[arg(short = 'k', long)]
    pub keyword_keys: bool,

    /// Read keywords as strings
    #[arg(long)]
    pub keywords_as_strings: bool,

    /// Maximum collection nesting depth
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Print filename for each output line (like grep -H)
    #[arg(short = 'H', long)]
    pub with_filename: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Args {
    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions::new()
            .with_keywords_as_strings(self.keywords_as_strings)
            .with_max_depth(self.max_depth)
    }

    pub fn writer_options(&self) -> WriterOptions {
        WriterOptions::new().with_keywords_in_maps(self.keyword_keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Args::command().debug_assert()
    }

    #[test]
    fn test_basic_args() {
        let args = Args::try_parse_from(["ednkit"]).unwrap();
        assert!(args.inputs.is_empty());
        assert!(!args.check);
        assert_eq!(args.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_input_args() {
        let args = Args::try_parse_from(["ednkit", "a.edn", "data/*.edn", "-"]).unwrap();
        assert_eq!(args.inputs, vec!["a.edn", "data/*.edn", "-"]);
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from(["ednkit", "-r", "-c", "-s", "-k", "dir"]).unwrap();
        assert!(args.recursive);
        assert!(args.check);
        assert!(args.slurp);
        assert!(args.keyword_keys);
        assert!(args.writer_options().use_keywords_in_maps);
    }

    #[test]
    fn test_reader_options() {
        let args = Args::try_parse_from(["ednkit", "--keywords-as-strings", "--max-depth", "8"]).unwrap();
        let options = args.reader_options();
        assert!(options.keywords_as_strings);
        assert_eq!(options.max_depth, 8);

        assert!(Args::try_parse_from(["ednkit", "--max-depth", "deep"]).is_err());
    }

    #[test]
    fn test_with_filename_flag() {
        let args = Args::try_parse_from(["ednkit", "-H", "file1.edn"]).unwrap();
        assert!(args.with_filename);

        let args = Args::try_parse_from(["ednkit", "--with-filename", "file1.edn"]).unwrap();
        assert!(args.with_filename);
    }
}
