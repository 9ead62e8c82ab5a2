use clap::{Arg, Command};
use log::LevelFilter;
use spamprob::corpus::CorpusReader;
use spamprob::evaluation::try_evaluate;
use spamprob::model::try_train;
use spamprob::{Classifier, Config, MalformedPolicy, Model, OutputFormat, Session};
use std::io;
use std::process;

fn main() {
    let matches = Command::new("spamprob")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Naive Bayes spam probability for short messages")
        .long_about(
            "Trains a Bernoulli Naive Bayes model from a labeled spam/ham corpus, then \
             reads messages from standard input one per line and prints the probability \
             that each one is spam.",
        )
        .arg(
            Arg::new("corpus")
                .value_name("CORPUS")
                .help("Training corpus with one `label,text` record per line (default: spam.csv)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("spamprob.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("no-header")
                .long("no-header")
                .help("The corpus has no header line; train on its first record too")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Abort training on the first malformed corpus record instead of skipping it")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("threshold")
                .long("threshold")
                .value_name("P")
                .help("Spam probability above which a message is reported as spam")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print one JSON object per classified message")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("evaluate")
                .long("evaluate")
                .help("Report accuracy of the trained model on its own corpus and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("spamprob.yaml");

    let mut config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    if let Some(corpus) = matches.get_one::<String>("corpus") {
        config.corpus_path = corpus.into();
    }
    if matches.get_flag("no-header") {
        config.has_header = false;
    }
    if matches.get_flag("strict") {
        config.on_malformed = MalformedPolicy::Abort;
    }
    if let Some(threshold) = matches.get_one::<f64>("threshold") {
        config.threshold = *threshold;
    }
    if matches.get_flag("json") {
        config.output = OutputFormat::Json;
    }
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        process::exit(1);
    }

    let model = train_model(&config);
    let classifier = Classifier::with_threshold(&model, config.threshold);

    if matches.get_flag("evaluate") {
        evaluate_model(&config, &classifier);
        return;
    }

    let session = Session::new(classifier, config.sentinels.clone(), config.output);
    let stdin = io::stdin();
    let stdout = io::stdout();
    match session.run(stdin.lock(), stdout.lock()) {
        Ok(classified) => log::debug!("Session ended after {classified} messages"),
        Err(e) => {
            eprintln!("Error during interactive session: {e}");
            process::exit(1);
        }
    }
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file(path)
    } else {
        log::warn!("Configuration file '{path}' not found, using default configuration");
        Ok(Config::default())
    }
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => println!("Default configuration written to: {path}"),
        Err(e) => {
            eprintln!("Error writing configuration file: {e:#}");
            process::exit(1);
        }
    }
}

fn train_model(config: &Config) -> Model {
    let mut reader = match CorpusReader::open(&config.corpus_path, config.read_options()) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("{e}");
            process::exit(e.exit_code());
        }
    };

    let model = match try_train(reader.by_ref()) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Training failed: {e}");
            process::exit(e.exit_code());
        }
    };

    let summary = reader.summary();
    if summary.skipped > 0 {
        log::warn!(
            "Skipped {} malformed records out of {} in {}",
            summary.skipped,
            summary.records + summary.skipped,
            config.corpus_path.display()
        );
    }
    if config.output == OutputFormat::Text {
        println!("data trained properly");
    }
    model
}

fn evaluate_model(config: &Config, classifier: &Classifier<'_>) {
    let reader = match CorpusReader::open(&config.corpus_path, config.read_options()) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("{e}");
            process::exit(e.exit_code());
        }
    };

    let evaluation = match try_evaluate(classifier, reader) {
        Ok(evaluation) => evaluation,
        Err(e) => {
            eprintln!("Evaluation failed: {e}");
            process::exit(e.exit_code());
        }
    };

    match config.output {
        OutputFormat::Json => match serde_json::to_string(&evaluation) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing evaluation: {e}");
                process::exit(1);
            }
        },
        OutputFormat::Text => {
            let model = classifier.model();
            println!(
                "Training documents: {} ({} spam, {} ham), vocabulary: {} tokens",
                model.total_count(),
                model.spam_count(),
                model.ham_count(),
                model.vocabulary_len()
            );
            println!(
                "Evaluated messages: {} (spam threshold {})",
                evaluation.total(),
                classifier.threshold()
            );
            println!("  Accuracy:  {:.1}%", evaluation.accuracy() * 100.0);
            println!("  Precision: {:.1}%", evaluation.precision() * 100.0);
            println!("  Recall:    {:.1}%", evaluation.recall() * 100.0);
            println!(
                "  Spam caught {} / missed {}, ham kept {} / flagged {}",
                evaluation.true_spam,
                evaluation.false_ham,
                evaluation.true_ham,
                evaluation.false_spam
            );
        }
    }
}
