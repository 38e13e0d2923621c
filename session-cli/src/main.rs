use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use exam_model::{ContentFilters, Selection, SessionType};
use qbank_client::HttpQuestionBank;
use session_wizard::{SessionWizard, SubmitOutcome, hierarchy};

mod cli;

use crate::cli::{Cli, Command, CreateArgs, FilterArgs};

type Wizard = SessionWizard<HttpQuestionBank>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let config = cli
        .api_config()
        .context("No API URL, pass --api-url or set QBANK_API_URL")?;
    log::info!("using question bank at {}", config.base_url);
    let api = Arc::new(HttpQuestionBank::new(config)?);
    let mut wizard = Wizard::load(api, Duration::from_millis(cli.debounce_ms))
        .await
        .context("Failed to load the content tree")?;

    match &cli.command {
        Command::Tree => print_tree(wizard.filters()),
        Command::Options(args) => {
            apply_filters(&mut wizard, args);
            let options = wizard
                .load_criteria_options()
                .await
                .context("Failed to load questions for the selection")?;
            if options.is_empty() {
                println!("No questions for this selection.");
                return Ok(());
            }
            println!("universities: {}", join(&options.universities));
            println!("sources:      {}", join(&options.sources));
            println!("years:        {}", join(&options.years));
            println!("rotations:    {}", join(&options.rotations));
            println!("types:        {}", join(&options.question_types));
        }
        Command::Count(args) => {
            apply_filters(&mut wizard, args);
            wizard.settle().await;
            let state = wizard.state();
            if !state.required_filters_complete() {
                println!("University, source and year are required to count questions.");
            } else {
                println!("{} questions available", state.available_count());
            }
        }
        Command::Create(args) => create(&mut wizard, args).await?,
    }
    Ok(())
}

fn apply_filters(wizard: &mut Wizard, args: &FilterArgs) {
    match args.selection.selection() {
        Selection::Unit(unit) => wizard.select_unit(Some(unit)),
        Selection::Module(module) => wizard.select_module(Some(module)),
        Selection::None => {}
    }
    let courses = hierarchy::course_names(wizard.filters(), wizard.state().selection());
    log::info!("courses in selection: {}", courses.join(", "));

    wizard.set_university(args.university());
    wizard.set_source(args.source());
    wizard.set_year(args.year);
    wizard.set_rotation(args.rotation);
    wizard.set_question_type(args.question_type);
}

async fn create(wizard: &mut Wizard, args: &CreateArgs) -> anyhow::Result<()> {
    apply_filters(wizard, &args.filters);
    wizard.set_title(args.title.as_str());
    if args.practice {
        wizard.set_session_type(SessionType::Practice);
    }
    wizard.settle().await;

    let outcome = wizard.submit().await?;
    println!("{}", outcome.message());
    if let SubmitOutcome::Created { route, .. } = &outcome {
        println!("{route}");
    }
    Ok(())
}

fn print_tree(filters: &ContentFilters) {
    for unit in &filters.unites {
        println!("unit {} {}", unit.id, unit.name);
        for module in &unit.modules {
            println!("  module {} {}", module.id, module.name);
            for course in &module.courses {
                println!("    course {} {}", course.id, course.name);
            }
        }
    }
    for module in &filters.independent_modules {
        println!("module {} {}", module.id, module.name);
        for course in &module.courses {
            println!("  course {} {}", course.id, course.name);
        }
    }
}

fn join<T: std::fmt::Display>(values: impl IntoIterator<Item = T>) -> String {
    let values: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}
