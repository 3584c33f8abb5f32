//! Interactive browse console.

mod command;
mod helper;

use anyhow::Result;
use colored::Colorize;
use kbpick_application::picker_controller::{OpenOutcome, PickerController};
use kbpick_core::error::KbPickError;
use kbpick_core::listing::{ListDisplay, ResourceRow, SortConfig};
use kbpick_core::model::Connection;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

use crate::context::AppContext;
use crate::render;
use command::{HELP, ReplCommand};
use helper::ConsoleHelper;

type CommandResult = std::result::Result<Flow, KbPickError>;

enum Flow {
    Continue,
    Quit,
}

struct Console<'a> {
    ctx: &'a AppContext,
    ctl: PickerController,
    connections: Vec<Connection>,
    /// Rows as last printed; row numbers refer to these.
    rows: Vec<ResourceRow>,
}

impl<'a> Console<'a> {
    fn new(ctx: &'a AppContext) -> Self {
        Self {
            ctx,
            ctl: PickerController::new(ctx.client.clone(), &ctx.config),
            connections: Vec::new(),
            rows: Vec::new(),
        }
    }

    fn prompt(&self) -> String {
        let crumbs = self.ctl.breadcrumbs();
        if crumbs.is_empty() {
            "kbpick:/> ".to_string()
        } else {
            format!("kbpick:/{}> ", crumbs.join("/"))
        }
    }

    /// Logs in with configured credentials until success or the attempt cap.
    async fn authenticate(&mut self) -> bool {
        if self.ctx.session.is_authenticated() {
            return true;
        }
        let Some(credentials) = self.ctx.configured_credentials() else {
            println!(
                "{}",
                "Not logged in. Set KBPICK_EMAIL and KBPICK_PASSWORD, then type 'login'.".yellow()
            );
            return false;
        };

        let usecase = &self.ctx.session_usecase;
        while !usecase.attempts_exhausted() {
            match usecase.login(&credentials).await {
                Ok(()) => {
                    println!("{}", "Logged in".green());
                    return true;
                }
                Err(e) => eprintln!("{}", format!("Authentication error: {}", e).red()),
            }
        }
        println!(
            "{}",
            "Maximum authentication attempts reached. Please check your credentials and type 'retry'."
                .red()
        );
        false
    }

    async fn start(&mut self) -> CommandResult {
        let connections = self.ctl.load_connections().await;
        if let Some(e) = connections.error {
            return Err(e);
        }
        self.connections = connections.data.unwrap_or_default();

        let org = self.ctl.load_organization().await;
        if let Some(e) = org.error {
            if e.is_auth() {
                return Err(e);
            }
            eprintln!("{}", format!("Could not resolve organization: {}", e).yellow());
        }
        self.show().await
    }

    fn connection_label(&self) -> String {
        let selected = self.ctl.store().selected_integration();
        self.connections
            .iter()
            .find(|c| Some(c.connection_id.as_str()) == selected)
            .map(|c| c.name.clone())
            .or_else(|| selected.map(str::to_string))
            .unwrap_or_else(|| "(no connection)".to_string())
    }

    fn print_listing(&mut self, display: ListDisplay) {
        let store = self.ctl.store();
        println!(
            "{}",
            render::format_breadcrumbs(&self.connection_label(), &self.ctl.breadcrumbs()).bold()
        );
        let mut status = format!("{} selected", store.selection_len());
        if !store.search_query().is_empty() {
            status.push_str(&format!(" | filter: \"{}\"", store.search_query()));
        }
        if let Some(kb) = store.current_knowledge_base_id() {
            status.push_str(&format!(" | kb: {}", kb));
        }
        if self.ctl.can_index() {
            status.push_str(" | 'index' available");
        }
        println!("{}", status.bright_black());

        for line in render::format_listing(&display) {
            println!("{}", line);
        }
        self.rows = display.rows().to_vec();
    }

    async fn show(&mut self) -> CommandResult {
        let display = self.ctl.list_view().await?;
        self.print_listing(display);
        Ok(Flow::Continue)
    }

    fn row(&self, number: usize) -> Option<ResourceRow> {
        let row = self.rows.get(number.wrapping_sub(1)).cloned();
        if row.is_none() {
            println!("{}", format!("No row {}", number).yellow());
        }
        row
    }

    async fn execute(&mut self, command: ReplCommand) -> CommandResult {
        match command {
            ReplCommand::Connections => {
                let state = self.ctl.refresh_connections().await;
                if let Some(e) = state.error {
                    return Err(e);
                }
                self.connections = state.data.unwrap_or_default();
                for line in render::format_connections(
                    &self.connections,
                    self.ctl.store().selected_integration(),
                ) {
                    println!("{}", line);
                }
                Ok(Flow::Continue)
            }
            ReplCommand::Use(number) => {
                let Some(connection) = number
                    .checked_sub(1)
                    .and_then(|i| self.connections.get(i))
                else {
                    println!("{}", format!("No connection {}", number).yellow());
                    return Ok(Flow::Continue);
                };
                let id = connection.connection_id.clone();
                self.ctl.select_connection(id);
                self.show().await
            }
            ReplCommand::List => self.show().await,
            ReplCommand::Enter(number) | ReplCommand::Open(number) => {
                let Some(row) = self.row(number) else {
                    return Ok(Flow::Continue);
                };
                match self.ctl.open(&row.resource) {
                    OpenOutcome::Entered => self.show().await,
                    OpenOutcome::External(url) => {
                        println!("{}", url.underline());
                        Ok(Flow::Continue)
                    }
                    OpenOutcome::Nothing => {
                        println!("{} has no link", row.name());
                        Ok(Flow::Continue)
                    }
                }
            }
            ReplCommand::Up => {
                self.ctl.navigate_back();
                self.show().await
            }
            ReplCommand::Root => {
                self.ctl.navigate_to_root();
                self.show().await
            }
            ReplCommand::Crumb(index) => {
                self.ctl.navigate_to_breadcrumb(index);
                self.show().await
            }
            ReplCommand::Select(numbers) => {
                for number in numbers {
                    if let Some(row) = self.row(number) {
                        self.ctl.toggle_selection(row.resource.resource_id);
                    }
                }
                self.show().await
            }
            ReplCommand::Find(text) => {
                self.ctl.set_search_query(text);
                self.show().await
            }
            ReplCommand::Sort(field, direction) => {
                self.ctl.set_sort(SortConfig::new(field, direction));
                self.show().await
            }
            ReplCommand::Index => self.index().await,
            ReplCommand::Unindex(numbers) => self.unindex(numbers).await,
            ReplCommand::Refresh => {
                let display = self.ctl.refresh().await?;
                self.print_listing(display);
                Ok(Flow::Continue)
            }
            ReplCommand::Login => {
                if self.authenticate().await {
                    return self.start().await;
                }
                Ok(Flow::Continue)
            }
            ReplCommand::Retry => {
                self.ctx.session_usecase.reset_login_attempts();
                if self.authenticate().await {
                    return self.start().await;
                }
                Ok(Flow::Continue)
            }
            ReplCommand::Logout => {
                self.ctx.session_usecase.logout().await?;
                self.ctl.reset();
                self.connections.clear();
                self.rows.clear();
                println!("Logged out");
                Ok(Flow::Continue)
            }
            ReplCommand::Help => {
                println!("{}", HELP.bright_black());
                Ok(Flow::Continue)
            }
            ReplCommand::Quit => Ok(Flow::Quit),
        }
    }

    async fn index(&mut self) -> CommandResult {
        if let Err(reason) = self.ctl.index_precondition() {
            println!("{}", format!("Cannot index: {}", reason).yellow());
            return Ok(Flow::Continue);
        }
        println!("{}", "Indexing...".bright_black());
        let outcome = self.ctl.index_selected().await?;
        println!("{}", render::format_index_outcome(&outcome));
        if let Some(e) = outcome.error.filter(KbPickError::is_auth) {
            return Err(e);
        }
        self.show().await
    }

    async fn unindex(&mut self, numbers: Vec<usize>) -> CommandResult {
        let mut resources = Vec::new();
        for number in numbers {
            let Some(row) = self.row(number) else {
                continue;
            };
            if row.can_unindex {
                resources.push(row.resource);
            } else {
                println!("{}", format!("{} is not indexed", row.name()).yellow());
            }
        }

        match resources.as_slice() {
            [] => return Ok(Flow::Continue),
            [single] => {
                self.ctl.unindex(single).await?;
                println!("{} {}", "unindexed".green(), single.path());
            }
            many => {
                for result in self.ctl.unindex_many(many).await? {
                    match result.result {
                        Ok(()) => println!("{} {}", "unindexed".green(), result.resource_path),
                        Err(e) if e.is_auth() => return Err(e),
                        Err(e) => println!("{} {}: {}", "failed".red(), result.resource_path, e),
                    }
                }
            }
        }
        self.show().await
    }

    /// Expired or missing sessions drop all picker state and try to log in again.
    async fn recover(&mut self, error: KbPickError) {
        if !error.is_auth() {
            eprintln!("{}", error.to_string().red());
            return;
        }
        eprintln!("{}", error.to_string().red());
        self.ctl.reset();
        self.connections.clear();
        self.rows.clear();
        if self.authenticate().await {
            if let Err(e) = self.start().await {
                eprintln!("{}", e.to_string().red());
            }
        }
    }
}

/// Runs the interactive console until `quit` or end of input.
pub async fn run(ctx: &AppContext) -> Result<()> {
    let mut rl: Editor<ConsoleHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ConsoleHelper::new()));

    println!("{}", "=== kbpick ===".bright_magenta().bold());
    println!("{}", "Type 'help' for commands, 'quit' to exit.".bright_black());
    println!();

    let mut console = Console::new(ctx);
    if console.authenticate().await {
        if let Err(e) = console.start().await {
            console.recover(e).await;
        }
    }

    loop {
        match rl.readline(&console.prompt()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let command = match trimmed.parse::<ReplCommand>() {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{}", e.yellow());
                        continue;
                    }
                };
                match console.execute(command).await {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(e) => console.recover(e).await,
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }
    println!("{}", "Goodbye!".bright_green());
    Ok(())
}
