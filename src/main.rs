pub mod dataset;

use anyhow::Error;
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use config::Config;
use factorization::FactorizationHandler;
use handler::{error::ErrorKind, Args, FileStorage, Handler, ToTable, Value};
use simplelog::{LevelFilter, SimpleLogger};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn using_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("using")
        .short("u")
        .long("using")
        .value_name("KEY=VALUE")
        .help("Option passed to the handler, ex. user_id=userId")
        .takes_value(true)
        .multiple(true)
        .number_of_values(1)
}

fn model_dir_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("model-dir")
        .long("model-dir")
        .value_name("DIR")
        .help("Directory where the model is stored, defaults to the configured root")
        .takes_value(true)
}

fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("recommender-handler")
        .version(VERSION)
        .about("Train and query factorization recommenders over CSV files")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("TOML configuration file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Log debug messages"),
        )
        .subcommand(
            SubCommand::with_name("train")
                .about("Train a model on a CSV file of interactions")
                .arg(
                    Arg::with_name("input")
                        .help("CSV file with one interaction per row")
                        .required(true),
                )
                .arg(
                    Arg::with_name("target")
                        .long("target")
                        .value_name("COLUMN")
                        .help("Name the model is trained for")
                        .takes_value(true)
                        .default_value("rating"),
                )
                .arg(model_dir_arg())
                .arg(using_arg()),
        )
        .subcommand(
            SubCommand::with_name("predict")
                .about("Print recommendations of a trained model")
                .arg(Arg::with_name("input").help("CSV file restricting the ids to predict for"))
                .arg(model_dir_arg())
                .arg(using_arg()),
        )
}

fn parse_using(matches: &ArgMatches) -> Result<Args, Error> {
    let mut args = Args::new();

    for pair in matches.values_of("using").into_iter().flatten() {
        let mut parts = pair.splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some(key), Some(value)) if !key.trim().is_empty() => {
                args.insert(key.trim().into(), Value::infer(value));
            }

            _ => {
                return Err(ErrorKind::InvalidArgument(
                    pair.into(),
                    "expected the form key=value".into(),
                )
                .into())
            }
        }
    }

    Ok(args)
}

fn storage_for(matches: &ArgMatches, config: &Config) -> Result<FileStorage, Error> {
    let root = match matches.value_of("model-dir") {
        Some(dir) => PathBuf::from(dir),
        None => config.storage.root.clone(),
    };

    FileStorage::new(root)
}

fn train(matches: &ArgMatches, config: &Config) -> Result<(), Error> {
    let args = parse_using(matches)?;
    let storage = storage_for(matches, config)?;
    let root = storage.root().to_path_buf();

    // both are required or defaulted by clap
    let input = matches.value_of("input").unwrap_or_default();
    let target = matches.value_of("target").unwrap_or("rating");

    let df = dataset::read_csv(input)?;
    let mut handler = FactorizationHandler::with_defaults(storage, config.defaults.clone());

    println!("{}", args.to_table());
    handler.create(target, &df, &args)?;
    println!(
        "Trained {} model on {} rows, stored in {}",
        handler.name(),
        df.len(),
        root.display()
    );

    Ok(())
}

fn predict(matches: &ArgMatches, config: &Config) -> Result<(), Error> {
    let args = parse_using(matches)?;
    let storage = storage_for(matches, config)?;

    let df = match matches.value_of("input") {
        Some(input) => Some(dataset::read_csv(input)?),
        None => None,
    };

    let handler = FactorizationHandler::with_defaults(storage, config.defaults.clone());
    let recommendations = handler.predict(df.as_ref(), &args)?;

    if recommendations.is_empty() {
        println!("No recommendations found");
    } else {
        println!("{}", recommendations.to_table());
    }

    Ok(())
}

fn log_level(config: &Config, verbose: bool) -> Result<LevelFilter, Error> {
    if verbose {
        return Ok(LevelFilter::Debug);
    }

    let level = &config.log.level;
    level.parse::<LevelFilter>().map_err(|_| {
        ErrorKind::InvalidArgument("log.level".into(), format!("unknown level '{}'", level)).into()
    })
}

fn main() -> Result<(), Error> {
    let matches = app().get_matches();

    let config = match matches.value_of("config") {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    SimpleLogger::init(
        log_level(&config, matches.is_present("verbose"))?,
        simplelog::Config::default(),
    )?;

    match matches.subcommand() {
        ("train", Some(matches)) => train(matches, &config),
        ("predict", Some(matches)) => predict(matches, &config),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Error;

    #[test]
    fn using_pairs_are_typed() -> Result<(), Error> {
        let matches = app().get_matches_from_safe(vec![
            "recommender-handler",
            "train",
            "ratings.csv",
            "-u",
            "user_id=userId",
            "-u",
            "epochs=5",
            "--using",
            "learning_rate=0.1",
            "-u",
            "threshold=",
        ])?;

        let (_, train) = matches.subcommand();
        let args = parse_using(train.unwrap())?;

        assert_eq!(args["user_id"], Value::from("userId"));
        assert_eq!(args["epochs"], Value::Int64(5));
        assert_eq!(args["learning_rate"], Value::Double(0.1));
        assert!(args["threshold"].is_null());

        Ok(())
    }

    #[test]
    fn log_level_comes_from_config() -> Result<(), Error> {
        let mut config = Config::default();
        assert_eq!(log_level(&config, false)?, LevelFilter::Info);

        config.log.level = "warn".into();
        assert_eq!(log_level(&config, false)?, LevelFilter::Warn);
        assert_eq!(log_level(&config, true)?, LevelFilter::Debug);

        config.log.level = "verbosee".into();
        let err = log_level(&config, false).unwrap_err();
        match err.downcast_ref::<ErrorKind>() {
            Some(ErrorKind::InvalidArgument(name, _)) => assert_eq!(name, "log.level"),
            other => panic!("unexpected error {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn malformed_using_pairs_fail() -> Result<(), Error> {
        let matches =
            app().get_matches_from_safe(vec!["recommender-handler", "predict", "-u", "epochs"])?;

        let (_, predict) = matches.subcommand();
        assert!(parse_using(predict.unwrap()).is_err());

        Ok(())
    }
}
