//! Counter Example - A clickable menu in the terminal
//!
//! This example demonstrates:
//! - A component with a state cell
//! - Keyed rows that keep their counts when reordered
//! - A paginated pane with previous/next controls
//! - Driving a menu from crossterm mouse input
//!
//! Left click adds one, right click removes one, the hopper rotates the
//! rows. `q` or Esc quits.
//!
//! Run with: cargo run --example counter
//! Logs go to stderr: RUST_LOG=spark_menu=debug cargo run --example counter 2>menu.log

use std::time::Duration;

use spark_menu::prelude::*;
use spark_menu::renderer::terminal::{
    enter_terminal, leave_terminal, poll_input, ScreenMapper, TerminalGrid, TerminalInput,
};

fn counter() -> Component {
    Component::new("counter", |ctx| {
        let count = ctx.use_state(|| 1u8)?;
        let material = ctx.props().text("material").unwrap_or("stone").to_string();
        let shown = count.get();

        Ok(vec![
            Leaf::new((0, 0), CellContent::new(material).amount(shown).named(format!("{shown}")))
                .on_click(move |event| match event.action() {
                    ActionKind::Left | ActionKind::ShiftLeft => count.set(shown.saturating_add(1).min(99)),
                    ActionKind::Right | ActionKind::ShiftRight => count.set(shown.saturating_sub(1).max(1)),
                    _ => Ok(()),
                })
                .into(),
        ])
    })
}

fn root() -> Component {
    let counter = counter();
    Component::new("demo", move |ctx| {
        let order = ctx.use_state(|| vec!["emerald", "diamond", "gold"])?;
        let rows = order.get();

        let mut nodes: Vec<Node> = rows
            .iter()
            .enumerate()
            .map(|(y, material)| {
                counter
                    .with(Props::new().with("material", *material))
                    .key(*material)
                    .at((0, y as u16))
                    .into()
            })
            .collect();

        nodes.push(
            Leaf::new((8, 0), CellContent::new("hopper").named("Rotate"))
                .on_click(move |_| order.update(|o| o.rotate_right(1)))
                .into(),
        );

        let wares = (1..=12u8)
            .map(|n| Leaf::new((0, 0), CellContent::new("book").amount(n)).into())
            .collect();
        let controls = PageControls::new(
            Leaf::new((2, 2), CellContent::new("arrow").named("Back")),
            Leaf::new((6, 2), CellContent::new("arrow").named("Next")),
        );
        nodes.push(paginated(Rect::new(2, 0, 5, 2), wares, Some(controls)).into());

        Ok(nodes)
    })
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = MenuConfig::new(GridSize::chest(3)).with_title("spark-menu counter (q to quit)");
    let grid = TerminalGrid::stdout().with_origin(2, 1);
    let mapper = ScreenMapper::new((2, 1), config.size);

    enter_terminal()?;
    let result = (|| -> std::result::Result<(), Box<dyn std::error::Error>> {
        let menu = Menu::open(root().node(), config, grid)?;
        loop {
            match poll_input(&mapper, Duration::from_millis(50))? {
                Some(TerminalInput::Event(event)) => {
                    menu.dispatch(event)?;
                }
                Some(TerminalInput::Quit) => break,
                None => {}
            }
        }
        menu.close()?;
        Ok(())
    })();
    leave_terminal()?;

    if let Err(err) = &result {
        eprintln!("counter demo failed: {err}");
    }
    result
}
