//! CLI argument parsing with clap.

use clap::Parser;

/// Prompt-to-image grid for the terminal, backed by Gemini.
#[derive(Parser, Debug)]
#[command(name = "imagegrid", version, about)]
pub struct Cli {
    /// Text prompt describing the desired images.
    #[arg(conflicts_with = "random")]
    pub prompt: Option<String>,

    /// Generate from a random prompt idea instead.
    #[arg(short, long)]
    pub random: bool,

    /// Aspect ratio: 1:1, 9:16, 3:4, 16:9, 4:3.
    #[arg(short, long)]
    pub aspect_ratio: Option<String>,

    /// Image model name or short alias.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Text model used for random prompts.
    #[arg(long)]
    pub text_model: Option<String>,

    /// Number of images to generate (1-4).
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=4))]
    pub count: Option<u32>,

    /// Output format: jpeg, png, webp.
    #[arg(short, long)]
    pub format: Option<String>,

    /// Directory to save images into.
    #[arg(short, long, default_value = ".")]
    pub output_dir: String,

    /// Run an interactive session.
    #[arg(short, long)]
    pub interactive: bool,

    /// Message language: tr, en.
    #[arg(long)]
    pub locale: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Whether to run the interactive session instead of a single workflow.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.interactive || (self.prompt.is_none() && !self.random)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_prompt() {
        let cli = Cli::parse_from(["imagegrid", "a cat"]);
        assert_eq!(cli.prompt.as_deref(), Some("a cat"));
        assert!(!cli.random);
        assert!(!cli.is_interactive());
    }

    #[test]
    fn default_values() {
        let cli = Cli::parse_from(["imagegrid", "a cat"]);
        assert!(cli.aspect_ratio.is_none());
        assert!(cli.model.is_none());
        assert!(cli.count.is_none());
        assert!(cli.format.is_none());
        assert_eq!(cli.output_dir, ".");
        assert!(!cli.verbose);
    }

    #[test]
    fn all_options() {
        let cli = Cli::parse_from([
            "imagegrid",
            "-m",
            "imagen-4-fast",
            "-a",
            "16:9",
            "-n",
            "2",
            "-f",
            "png",
            "-o",
            "out",
            "--locale",
            "en",
            "-v",
            "a landscape",
        ]);
        assert_eq!(cli.model.as_deref(), Some("imagen-4-fast"));
        assert_eq!(cli.aspect_ratio.as_deref(), Some("16:9"));
        assert_eq!(cli.count, Some(2));
        assert_eq!(cli.format.as_deref(), Some("png"));
        assert_eq!(cli.output_dir, "out");
        assert_eq!(cli.locale.as_deref(), Some("en"));
        assert!(cli.verbose);
        assert_eq!(cli.prompt.as_deref(), Some("a landscape"));
    }

    #[test]
    fn no_prompt_means_interactive() {
        assert!(Cli::parse_from(["imagegrid"]).is_interactive());
        assert!(!Cli::parse_from(["imagegrid", "--random"]).is_interactive());
        assert!(Cli::parse_from(["imagegrid", "-i", "a cat"]).is_interactive());
    }

    #[test]
    fn count_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["imagegrid", "-n", "5", "a cat"]).is_err());
        assert!(Cli::try_parse_from(["imagegrid", "-n", "0", "a cat"]).is_err());
    }

    #[test]
    fn prompt_conflicts_with_random() {
        assert!(Cli::try_parse_from(["imagegrid", "--random", "a cat"]).is_err());
    }
}
