use clap::{Args, Parser, Subcommand};
use exam_model::{
    ModuleId, QuestionSourceId, QuestionType, Rotation, Selection, UnitId, UniversityId,
};
use qbank_client::{API_TOKEN_VAR, ApiConfig};

#[derive(Parser)]
#[command(
    name = "session-cli",
    version,
    about = "Build exam sessions against the question bank API"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Base URL of the question bank API (defaults to $QBANK_API_URL).
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Bearer token sent with every request.
    #[arg(long, global = true, env = API_TOKEN_VAR, hide_env_values = true)]
    pub token: Option<String>,

    /// How long filters must stay unchanged before the question count is requested.
    #[arg(long, global = true, default_value_t = 300, value_name = "MS")]
    pub debounce_ms: u64,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the unit → module → course tree.
    Tree,
    /// List the filter values that still match questions of a unit or module.
    Options(FilterArgs),
    /// Ask how many questions the filters leave.
    Count(FilterArgs),
    /// Create a session.
    Create(CreateArgs),
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SelectionArgs {
    #[arg(long)]
    pub unit: Option<u64>,
    /// An independent module.
    #[arg(long)]
    pub module: Option<u64>,
}

impl SelectionArgs {
    pub fn selection(&self) -> Selection {
        match (self.unit, self.module) {
            (Some(unit), _) => Selection::Unit(UnitId(unit)),
            (None, Some(module)) => Selection::Module(ModuleId(module)),
            (None, None) => Selection::None,
        }
    }
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,
    #[arg(long)]
    pub university: Option<u64>,
    #[arg(long)]
    pub source: Option<u64>,
    #[arg(long)]
    pub year: Option<u16>,
    /// R1 to R4.
    #[arg(long)]
    pub rotation: Option<Rotation>,
    /// SINGLE_CHOICE or MULTIPLE_CHOICE.
    #[arg(long = "type")]
    pub question_type: Option<QuestionType>,
}

impl FilterArgs {
    pub fn university(&self) -> Option<UniversityId> {
        self.university.map(UniversityId)
    }

    pub fn source(&self) -> Option<QuestionSourceId> {
        self.source.map(QuestionSourceId)
    }
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub filters: FilterArgs,
    #[arg(long)]
    pub title: String,
    /// Create a practice session instead of an exam.
    #[arg(long)]
    pub practice: bool,
}

impl Cli {
    pub fn api_config(&self) -> anyhow::Result<ApiConfig> {
        let mut config = match &self.api_url {
            Some(url) => ApiConfig::new(url.as_str()),
            None => ApiConfig::from_env()?,
        };
        if let Some(token) = &self.token {
            config.access_token = Some(token.clone());
        }
        Ok(config)
    }
}
