//! Example: tabbing through a chart-like widget
//!
//! Run with `RUST_LOG=keynav=debug` to watch the coordinator.

use keynav::dom::{Document, Key, KeyModifiers, NodeId};
use keynav::button_group::GROUP_ATTRIBUTE;
use keynav::{ButtonGroup, FactoryContext, KeyboardNavigationConfig, ModuleFactories, NavigationHost, NavigationModule};
use tracing_subscriber::EnvFilter;

fn describe(host: &NavigationHost, node: Option<NodeId>) -> String {
    match node {
        Some(id) => host
            .document()
            .tree()
            .get(id)
            .map_or_else(|| format!("{id:?}"), |n| format!("<{}> {id:?}", n.tag)),
        None => "none".to_string(),
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut doc = Document::new();
    let body = doc.body();
    let search = doc.create_child(body, "input")?;
    doc.set_tab_index(search, 0)?;

    let chart = doc.create_child(body, "div")?;
    for group in ["zoom", "zoom", "legend", "legend", "legend"] {
        let item = doc.create_child(chart, "rect")?;
        doc.set_attribute(item, GROUP_ATTRIBUTE, group)?;
    }

    let footer = doc.create_child(body, "a")?;
    doc.set_tab_index(footer, 0)?;

    let config = KeyboardNavigationConfig::from_json(r#"{"order": ["zoom", "legend"]}"#)?;
    let factories = ModuleFactories::button_groups(["zoom"]).with("legend", |ctx: &FactoryContext<'_>| {
        Box::new(
            ButtonGroup::collect(ctx.document, ctx.widget, "legend")
                .on_activate(|_, node| println!("  toggled legend item {node:?}")),
        ) as Box<dyn NavigationModule>
    });

    let mut host = NavigationHost::new(doc);
    let widget = host.mount(chart, config, factories)?;
    println!("keynav v{} mounted {:?}", keynav::VERSION, widget);

    host.focus(search);
    let tour = [
        (Key::Tab, false),
        (Key::ArrowRight, false),
        (Key::Tab, false),
        (Key::ArrowDown, false),
        (Key::Enter, false),
        (Key::Tab, false),
        (Key::Tab, true),
        (Key::Tab, true),
        (Key::Tab, true),
    ];

    for (key, shift) in tour {
        let modifiers = KeyModifiers { shift, ..Default::default() };
        let label = if shift { format!("Shift+{key:?}") } else { format!("{key:?}") };
        let event = host.key_down(key, modifiers);

        let nav = host.coordinator(widget);
        println!(
            "{:<14} focus: {:<24} module: {:<8} indicator: {}{}",
            label,
            describe(&host, host.document().focused()),
            nav.and_then(|n| n.active_feature()).unwrap_or("-"),
            describe(&host, host.document().focus_indicator()),
            if event.is_default_prevented() { "  (handled)" } else { "" },
        );
    }

    host.teardown(widget)?;
    println!("Torn down, {} listeners left", host.document().listeners().len());
    Ok(())
}
