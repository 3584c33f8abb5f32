use anyhow::{Result, bail};
use kbpick_application::PickerController;
use kbpick_core::api::KnowledgeBaseApi;
use kbpick_core::listing::{SortConfig, SortDirection, SortField};

use crate::context::AppContext;
use crate::render;

pub async fn connections(ctx: &AppContext) -> Result<()> {
    ctx.require_session().await?;
    let connections = ctx.client.list_connections().await?;
    for line in render::format_connections(&connections, None) {
        println!("{}", line);
    }
    Ok(())
}

pub struct LsArgs {
    pub connection: Option<String>,
    pub path: Option<String>,
    pub search: Option<String>,
    pub sort: SortField,
    pub desc: bool,
    pub knowledge_base: Option<String>,
}

/// Lists a folder given as a `/`-separated name path from the connection root.
pub async fn ls(ctx: &AppContext, args: LsArgs) -> Result<()> {
    ctx.require_session().await?;
    let mut ctl = PickerController::new(ctx.client.clone(), &ctx.config);
    match args.connection {
        Some(id) => ctl.select_connection(id),
        None => {
            let state = ctl.load_connections().await;
            if let Some(e) = state.error {
                return Err(e.into());
            }
        }
    }
    if ctl.store().selected_integration().is_none() {
        bail!("No connections available");
    }
    if args.knowledge_base.is_some() {
        ctl.set_knowledge_base(args.knowledge_base);
    }
    let direction = if args.desc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };
    ctl.set_sort(SortConfig::new(args.sort, direction));

    if let Some(path) = args.path.as_deref() {
        enter_path(&mut ctl, path).await?;
    }
    if let Some(search) = args.search {
        ctl.set_search_query(search);
    }

    let display = ctl.list_view().await?;
    for line in render::format_listing(&display) {
        println!("{}", line);
    }
    Ok(())
}

/// Walks `path` segment by segment, entering the matching directory each time.
async fn enter_path(ctl: &mut PickerController, path: &str) -> Result<()> {
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        let display = ctl.list_view().await?;
        let Some(dir) = display
            .rows()
            .iter()
            .find(|row| row.is_directory() && row.name() == segment)
            .map(|row| row.resource.clone())
        else {
            bail!("No folder named '{}' in {}", segment, current_label(ctl));
        };
        ctl.open(&dir);
    }
    Ok(())
}

fn current_label(ctl: &PickerController) -> String {
    render::format_breadcrumbs("/", &ctl.breadcrumbs())
}

pub async fn kb_ls(ctx: &AppContext, knowledge_base: Option<String>, path: Option<String>) -> Result<()> {
    ctx.require_session().await?;
    let kb = ctx.knowledge_base_id(knowledge_base)?;
    let path = path.unwrap_or_else(|| "/".to_string());
    let page = ctx.client.list_knowledge_base_children(&kb, &path).await?;
    if page.data.is_empty() {
        println!("No files found");
    }
    for resource in &page.data {
        println!("{}", render::format_knowledge_base_entry(resource));
    }
    Ok(())
}
