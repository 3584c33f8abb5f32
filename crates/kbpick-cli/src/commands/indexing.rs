use anyhow::{Result, bail};
use colored::Colorize;
use kbpick_application::{IndexingUseCase, PickerController};

use crate::context::AppContext;
use crate::render;

pub async fn index(ctx: &AppContext, connection: String, resource_ids: Vec<String>) -> Result<()> {
    ctx.require_session().await?;
    let mut ctl = PickerController::new(ctx.client.clone(), &ctx.config);
    ctl.select_connection(connection);
    let org = ctl.load_organization().await;
    if let Some(e) = org.error {
        return Err(e.into());
    }
    for id in resource_ids {
        ctl.toggle_selection(id);
    }

    let outcome = ctl.index_selected().await?;
    println!("{}", render::format_index_outcome(&outcome));
    if !outcome.is_success() {
        bail!("Indexing did not complete");
    }
    Ok(())
}

pub async fn unindex(ctx: &AppContext, knowledge_base: Option<String>, paths: Vec<String>) -> Result<()> {
    ctx.require_session().await?;
    let kb = ctx.knowledge_base_id(knowledge_base)?;
    let usecase = IndexingUseCase::new(ctx.client.clone(), &ctx.config);

    let mut failed = 0;
    for result in usecase.unindex_many(&kb, &paths).await {
        match result.result {
            Ok(()) => println!("{} {}", "unindexed".green(), result.resource_path),
            Err(e) => {
                failed += 1;
                println!("{} {}: {}", "failed".red(), result.resource_path, e);
            }
        }
    }
    if failed > 0 {
        bail!("{} of {} unindex call(s) failed", failed, paths.len());
    }
    Ok(())
}
