use std::io;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, instrument};

use crate::cli::ui::Painter;
use crate::cli::{Command, LogLevel, OutputFormat, RuntimeOptions};
use crate::config::StatePaths;
use crate::dispatch::Dispatcher;
use crate::outbox::{FileOutbox, MemoryOutbox, OutboxStore};
use crate::profile::{FileProfileStore, MemoryProfileStore, ProfileStore};
use crate::sync::{ConnectivityMonitor, SyncEngine};
use crate::telemetry;
use crate::terminal::{SystemTerminalClient, TerminalClient};
use crate::transport::{ScriptedTransport, SmsUriTransport, Transport};

/// Stores, transport and engine wired together for one run.
pub struct Services {
    dispatcher: Dispatcher,
    monitor: ConnectivityMonitor,
}

impl Services {
    /// Opens the file-backed stores under the configured state directory.
    ///
    /// ```
    /// # async fn demo() -> anyhow::Result<()> {
    /// let dir = std::env::temp_dir().join("trailcam-doc-services");
    /// let options = trailcam::RuntimeOptions::builder().state_dir(dir).build();
    /// let services = trailcam::Services::open(&options).await?;
    /// assert!(services.dispatcher().engine().is_online());
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error when no state directory can be resolved or a store
    /// file cannot be read.
    #[instrument(skip(options), level = "debug")]
    pub async fn open(options: &RuntimeOptions) -> Result<Self> {
        let paths = StatePaths::resolve(options.state_dir())?;
        debug!(root = %paths.root().display(), "opening state");
        let profiles = FileProfileStore::open(paths.profiles())?;
        let outbox = FileOutbox::open(paths.outbox()).await?;
        Ok(Self::with_stores(
            Arc::new(profiles),
            Arc::new(outbox),
            transport_for(options),
            options,
        ))
    }

    /// Keeps everything in memory; nothing survives the process.
    #[must_use]
    pub fn in_memory(options: &RuntimeOptions) -> Self {
        Self::with_stores(
            Arc::new(MemoryProfileStore::new()),
            Arc::new(MemoryOutbox::new()),
            transport_for(options),
            options,
        )
    }

    /// Wires caller-provided stores and transport.
    #[must_use]
    pub fn with_stores(
        profiles: Arc<dyn ProfileStore>,
        outbox: Arc<dyn OutboxStore>,
        transport: Arc<dyn Transport>,
        options: &RuntimeOptions,
    ) -> Self {
        let monitor = ConnectivityMonitor::new(options.connectivity());
        let engine = SyncEngine::builder()
            .outbox(outbox)
            .transport(transport)
            .connectivity(monitor.subscribe())
            .config(options.sync_config())
            .build();
        Self {
            dispatcher: Dispatcher::new(profiles, Arc::new(engine)),
            monitor,
        }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.monitor
    }
}

fn transport_for(options: &RuntimeOptions) -> Arc<dyn Transport> {
    match options.fake_transport() {
        Some(script) => Arc::new(ScriptedTransport::new(script.clone())),
        None => Arc::new(SmsUriTransport::new(Box::new(io::stderr()))),
    }
}

/// Runs the CLI command against the file-backed state.
///
/// ```
/// # async fn run() -> anyhow::Result<()> {
/// use clap::Parser;
///
/// let state_dir = std::env::temp_dir().join("trailcam-doc-run");
/// let args = trailcam::Args::try_parse_from([
///     "trailcam",
///     "--state-dir",
///     state_dir.to_str().unwrap_or("."),
///     "--fake-transport",
///     "ok",
///     "outbox",
///     "list",
/// ])?;
/// let log_level = args.log_level();
/// let (command, options) = args.into_command_and_options()?;
/// let mut out = Vec::new();
/// trailcam::run(command, &options, &mut out, log_level, trailcam::OutputFormat::Json).await?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, the state cannot be
/// opened, the command fails, or output writing fails.
pub async fn run<W>(
    command: Command,
    options: &RuntimeOptions,
    out: &mut W,
    log_level: Option<LogLevel>,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    initialise_tracing(&SystemTerminalClient, log_level)?;
    let services = Services::open(options).await?;
    run_with_clients(
        command,
        out,
        &SystemTerminalClient,
        &services,
        log_level,
        output_format,
    )
    .await
}

/// Runs the CLI command with injected clients and services.
///
/// ```
/// # async fn run() -> anyhow::Result<()> {
/// use clap::Parser;
///
/// struct FakeTerminal;
/// impl trailcam::TerminalClient for FakeTerminal {
///     fn stdout_is_terminal(&self) -> bool { false }
///     fn stderr_is_terminal(&self) -> bool { false }
/// }
///
/// let args = trailcam::Args::try_parse_from([
///     "trailcam",
///     "--fake-transport",
///     "ok",
///     "camera",
///     "list",
/// ])?;
/// let (command, options) = args.into_command_and_options()?;
/// let services = trailcam::Services::in_memory(&options);
/// let mut out = Vec::new();
/// trailcam::run_with_clients(
///     command,
///     &mut out,
///     &FakeTerminal,
///     &services,
///     None,
///     trailcam::OutputFormat::Json,
/// ).await?;
/// assert_eq!("[]\n", String::from_utf8(out)?);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, the command fails, or
/// output writing fails.
#[instrument(
    skip(out, terminal_client, services),
    level = "info",
    fields(command = %command.name(), ?log_level, ?output_format)
)]
pub async fn run_with_clients<W>(
    command: Command,
    out: &mut W,
    terminal_client: &dyn TerminalClient,
    services: &Services,
    log_level: Option<LogLevel>,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    initialise_tracing(terminal_client, log_level)?;
    let painter = Painter::new(
        output_format == OutputFormat::Pretty && terminal_client.stdout_is_terminal(),
    );
    let dispatcher = services.dispatcher();
    let engine = dispatcher.engine();

    if command.drains_on_startup() {
        let report = engine.drain_on_startup().await?;
        crate::cli::outbox::warn_dead_letters(&report);
    }

    match command {
        Command::Camera(args) => crate::cli::camera::run(
            dispatcher.profiles().as_ref(),
            &args,
            out,
            output_format,
            &painter,
        ),
        Command::Settings(args) => {
            crate::cli::settings::run(dispatcher, &args, out, output_format, &painter)
        }
        Command::Preview(args) => {
            crate::cli::send::run_preview(dispatcher, &args, out, output_format, &painter)
        }
        Command::Send(args) => {
            crate::cli::send::run_send(dispatcher, &args, out, output_format, &painter).await
        }
        Command::Capture(args) => {
            crate::cli::send::run_capture(dispatcher, &args, out, output_format, &painter).await
        }
        Command::Outbox(args) => {
            crate::cli::outbox::run(engine, &args, out, output_format, &painter).await
        }
    }
}

fn initialise_tracing(
    terminal_client: &dyn TerminalClient,
    log_level: Option<LogLevel>,
) -> Result<()> {
    telemetry::initialise_tracing(
        "trailcam",
        terminal_client.stderr_is_terminal(),
        log_level.map(LogLevel::as_level_filter),
    )?;
    Ok(())
}
