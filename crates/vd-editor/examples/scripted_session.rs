//! Replays a short editing session and prints the resulting scene as JSON.
//!
//! ```sh
//! RUST_LOG=debug cargo run -p vd-editor --example scripted_session
//! ```

use vd_core::{Insets, Node, NodeType};
use vd_editor::{Editor, InputEvent, Modifiers};

fn main() {
    env_logger::init();

    let mut editor = Editor::default();
    let page = Node::builder(NodeType::Frame)
        .id("page")
        .display_name("Page")
        .absolute(Insets::new(100.0, 100.0, 9100.0, 9300.0))
        .build();
    match page {
        Ok(page) => {
            editor.add_nodes([page]);
        }
        Err(err) => {
            log::error!("{err}");
            return;
        }
    }

    let cmd = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };
    let script = [
        // Draw a text box inside the page.
        InputEvent::key("t", Modifiers::NONE),
        InputEvent::pointer_down(200.0, 200.0),
        InputEvent::pointer_move(320.0, 240.0),
        InputEvent::pointer_up(320.0, 240.0),
        // Drag it right by 40px.
        InputEvent::pointer_down(250.0, 220.0),
        InputEvent::pointer_move(290.0, 220.0),
        InputEvent::pointer_up(290.0, 220.0),
        // Duplicate it onto the bare canvas.
        InputEvent::key("c", cmd),
        InputEvent::key("Escape", Modifiers::NONE),
        InputEvent::pointer_move(1500.0, 400.0),
        InputEvent::key("v", cmd),
    ];
    for event in &script {
        editor.dispatch(event);
    }

    match serde_json::to_string_pretty(editor.store().nodes()) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("serialize scene: {err}"),
    }
}
