use anyhow::Context;
use chef::kitchen::Options;
use clap::Parser;

/// Run a Chef recipe.
#[derive(Parser, Debug)]
#[command()]
struct Args {
    /// File containing a Chef recipe.
    #[arg()]
    file: String,
    /// Maximum nesting depth for `Serve with` invocations.
    #[arg(long, default_value_t = 64)]
    max_sous_chef_depth: usize,
    /// A limit for the number of executed statements.
    /// If the limit is reached, the recipe will be stopped with an error.
    #[arg(long, short = 'l')]
    statement_limit: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let source = std::fs::read_to_string(&args.file)
        .with_context(|| format!("could not read recipe `{}`", args.file))?;

    let options = Options {
        max_sous_chef_depth: args.max_sous_chef_depth,
        max_statements: args.statement_limit.unwrap_or(u64::MAX),
    };

    for dish in chef::execute_with_options(&source, options)? {
        println!("{}", dish);
    }

    Ok(())
}
