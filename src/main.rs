use clap::Parser;
use reposcript::environment::Environment;
use reposcript::{eval, parser, repl, scripts, version};

#[derive(Parser)]
#[command(name = "reposcript")]
#[command(about = "A tiny scripting language for querying tags and commit history in a repository")]
#[command(version)]
struct Cli {
    /// The script file to execute
    #[arg(long = "script")]
    script: Option<String>,

    /// Execute a script given inline
    #[arg(short = 'c')]
    command: Option<String>,

    /// The ticket-key spec used to extract issue ids from commit messages
    #[arg(long = "tickets", default_value = "*")]
    tickets: String,

    /// Force interactive mode regardless of other flags
    #[arg(long = "repl")]
    repl: bool,

    /// Run the canned "latest release vs previous release" script
    #[arg(long = "semver-latest")]
    semver_latest: bool,

    /// Run the canned "latest build vs previous build" script
    #[arg(long = "semver-latest-builds")]
    semver_latest_builds: bool,

    /// Run the canned "latest rc vs previous rc" script
    #[arg(long = "semver-latest-rcs")]
    semver_latest_rcs: bool,
}

fn main() {
    let cli = Cli::parse();

    let canned_count = [
        cli.semver_latest,
        cli.semver_latest_builds,
        cli.semver_latest_rcs,
    ]
    .iter()
    .filter(|&&b| b)
    .count();

    if cli.repl {
        let stdin = std::io::stdin();
        let mut reader = stdin.lock();
        let mut stdout = std::io::stdout();
        if let Err(err) = repl::start(&mut reader, &mut stdout, &cli.tickets) {
            eprintln!("Error: repl failed: {}", err);
            std::process::exit(1);
        }
        return;
    }

    if canned_count > 1 || (canned_count == 1 && (cli.script.is_some() || cli.command.is_some())) {
        eprintln!("Error: --semver-latest, --semver-latest-builds and --semver-latest-rcs are mutually exclusive with each other and with --script/-c");
        std::process::exit(2);
    }

    let script = if cli.semver_latest {
        scripts::DIFF_LATEST_SEMVER.to_string()
    } else if cli.semver_latest_builds {
        scripts::DIFF_LATEST_SEMVER_WITH_LATEST_BUILDS.to_string()
    } else if cli.semver_latest_rcs {
        scripts::DIFF_LATEST_SEMVER_WITH_LATEST_RCS.to_string()
    } else if let Some(ref inline) = cli.command {
        inline.clone()
    } else if let Some(ref path) = cli.script {
        match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                eprintln!("Error: cannot read script file: {}: {}", path, err);
                std::process::exit(1);
            }
        }
    } else {
        eprintln!(
            "Usage: reposcript [--script FILE | -c SCRIPT | --repl | --semver-latest | --semver-latest-builds | --semver-latest-rcs] [--tickets SPEC]"
        );
        std::process::exit(2);
    };

    println!("{}", version::get());

    let (program, errors) = parser::parse(&script);
    if !errors.is_empty() {
        eprintln!("parser errors:");
        for msg in &errors {
            eprintln!("\t{}", msg);
        }
        std::process::exit(1);
    }

    let env = Environment::with_params(&cli.tickets);
    let result = eval::eval_program(&program, &env);
    if let Some(msg) = result.error_message() {
        eprintln!("ERROR: {}", msg);
        std::process::exit(1);
    }
}
