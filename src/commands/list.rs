use crate::args::ListArgs;
use crate::commands::Out;
use crate::view::View;
use crate::{render, Config, Dashboard, Result};
use tracing::debug;

/// Builds the expense list once, applying the search, category filter and sort order from
/// `args`. Only the first page is included unless `args.all` is set.
pub async fn list(config: Config, args: ListArgs) -> Result<Out<View>> {
    let config = if args.all {
        config.with_page_size(usize::MAX)?
    } else {
        config
    };
    let mut dashboard = Dashboard::load(&config).await?;
    if let Some(term) = &args.search {
        dashboard.set_search_term(term.clone());
    }
    dashboard.set_category_filter(args.category);
    dashboard.set_sort(args.sort);

    let view = dashboard.view();
    debug!("{} of {} expenses match", view.len(), view.matched);
    let message = render::expense_list(&view, dashboard.view_state());
    Ok(Out::new(message, view))
}
