use std::path::PathBuf;

use clap::{ArgAction, Parser};
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

use build_configurator::{
    FileConfigurationService, FileServiceOptions, FormSubmission, OutputOptions, PageController,
    PageOptions, PageRequest,
    domain::PageMode,
    form::{FieldRef, FormError},
    io::output::emit,
};

#[derive(Debug, Parser)]
#[command(
    name = "configurator",
    version,
    about = "Open, edit and submit CI build configurations stored in a directory"
)]
struct Cli {
    /// Directory holding defaults, users and one folder per configuration
    #[arg(short = 's', long = "store", value_name = "DIR")]
    store: PathBuf,

    /// Page query, e.g. "name=core&type=edit"; empty starts a new configuration
    #[arg(short = 'q', long = "query", value_name = "QUERY", default_value = "")]
    query: String,

    /// Id of the acting user
    #[arg(short = 'u', long = "user", value_name = "ID", default_value = "anonymous")]
    user: String,

    /// User ids treated as administrators
    #[arg(long = "admin", value_name = "ID", action = ArgAction::Append)]
    admins: Vec<String>,

    /// Field edits applied after loading, as FIELD=VALUE (e.g. projectToBuild_0/projectUrl=...)
    #[arg(long = "set", value_name = "FIELD=VALUE", action = ArgAction::Append)]
    edits: Vec<String>,

    /// Validate and save the form
    #[arg(long = "submit", conflicts_with_all = ["approve", "reject"])]
    submit: bool,

    /// Approve the pending configuration (approve-reject pages only)
    #[arg(long = "approve", conflicts_with = "reject")]
    approve: bool,

    /// Reject the pending configuration with the given reason
    #[arg(long = "reject", value_name = "REASON")]
    reject: Option<String>,

    /// Show the resulting page in the terminal before printing the report
    #[arg(long = "review")]
    review: bool,

    /// Pretty-print the JSON report
    #[arg(long = "pretty")]
    pretty: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to start runtime")?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let request = PageRequest::parse(&cli.query).map_err(Report::msg)?;
    if cli.approve && request.mode != PageMode::ApproveReject {
        return Err(eyre!("--approve needs a query with type=ApproveReject"));
    }

    let service = FileConfigurationService::new(
        FileServiceOptions::new(&cli.store)
            .with_user(cli.user.clone())
            .with_administrators(cli.admins.clone()),
    );
    let options = PageOptions::default().with_user(cli.user.clone());
    let mut page = PageController::new(service, request, options);

    page.init_page()
        .await
        .wrap_err_with(|| format!("failed to open page from {}", cli.store.display()))?;

    let outcome = act(&mut page, &cli).await;

    if cli.review {
        build_configurator::app::review(page.form(), page.status()).map_err(Report::msg)?;
    }

    let submission = match &outcome {
        Ok(submission) => submission.as_ref(),
        Err(_) => None,
    };
    emit(
        &report(&page, submission),
        &OutputOptions::default().with_pretty(cli.pretty),
    )
    .map_err(Report::msg)?;

    outcome.map(|_| ()).map_err(Report::from)
}

async fn act(
    page: &mut PageController<FileConfigurationService>,
    cli: &Cli,
) -> Result<Option<FormSubmission>, FormError> {
    for edit in &cli.edits {
        let Some((name, value)) = edit.split_once('=') else {
            tracing::warn!(edit = %edit, "ignoring edit without '='");
            continue;
        };
        match name.parse::<FieldRef>() {
            Ok(field) => {
                page.edit(&field, value)?;
                if matches!(
                    field,
                    FieldRef::PollScmTrigger | FieldRef::BuildPeriodicallyTrigger
                ) {
                    page.check_trigger(field).await?;
                }
            }
            Err(err) => tracing::warn!(%err, "ignoring edit"),
        }
    }

    if let Some(reason) = &cli.reject {
        page.open_reject()?;
        page.edit(&FieldRef::RejectionReason, reason.clone())?;
        return page.ok_reject().await;
    }
    if cli.submit || cli.approve {
        return page.submit().await.map(Some);
    }
    Ok(None)
}

fn report(
    page: &PageController<FileConfigurationService>,
    submission: Option<&FormSubmission>,
) -> Value {
    let form = page.form();
    let changes: Vec<Value> = form
        .diff
        .changes()
        .iter()
        .map(|change| json!({ "field": change.field.element_id(), "was": change.old_text }))
        .collect();
    json!({
        "mode": format!("{:?}", page.mode()),
        "status": page.status().message(),
        "isError": page.status().is_error(),
        "focus": form.focus.as_ref().map(FieldRef::element_name),
        "configuration": form.to_configuration(),
        "changes": changes,
        "changedMachines": form.diff.changed_machines(),
        "submission": submission,
    })
}
