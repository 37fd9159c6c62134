//! Then steps for board reordering BDD scenarios.

use super::world::{BoardWorld, run_async, split_titles};
use corkboard::ordering::domain::ContainerView;
use eyre::WrapErr;
use rstest_bdd_macros::then;

fn ensure_order(view: &ContainerView, expected: &str) -> Result<(), eyre::Report> {
    let actual: Vec<String> = view.items.iter().map(|item| item.label.clone()).collect();
    let wanted = split_titles(expected);
    if actual != wanted {
        return Err(eyre::eyre!("expected order {wanted:?}, found {actual:?}"));
    }
    if !view.is_dense() {
        return Err(eyre::eyre!("ranks are not dense: {:?}", view.items));
    }
    Ok(())
}

#[then(r#"the board order is "{titles}""#)]
fn board_order_is(world: &BoardWorld, titles: String) -> Result<(), eyre::Report> {
    let view = run_async(world.service.board_view(world.board_id))
        .wrap_err("read board view")?;
    ensure_order(&view, &titles)
}

#[then(r#"the tasks of "{status_list}" are "{titles}""#)]
fn tasks_of_status_list_are(
    world: &BoardWorld,
    status_list: String,
    titles: String,
) -> Result<(), eyre::Report> {
    let status_list_id = world.status_list(&status_list)?;
    let view = run_async(world.service.status_list_view(status_list_id))
        .wrap_err("read status list view")?;
    ensure_order(&view, &titles)
}
