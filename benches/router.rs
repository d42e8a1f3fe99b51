use criterion::{Criterion, black_box, criterion_group, criterion_main};
use crossterm::event::{KeyCode, KeyModifiers};
use intui::logging::{LogEvent, LogSink};
use intui::prop::Axis;
use intui::{
    DamageTracker, InputEvent, InputRouter, LayoutBox, Logger, LoggingResult, MonospaceFont,
    NewScreen, NewWindow, Owner, Rect, Registry, Result, RouterConfig, Size, widgets,
};

#[derive(Clone, Default)]
struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _event: &LogEvent) -> LoggingResult<()> {
        Ok(())
    }
}

fn router_pointer_script(c: &mut Criterion) {
    let script = scripted_events();
    c.bench_function("router_pointer_script", |b| {
        b.iter(|| {
            let (mut registry, mut router) = build_session().expect("session");
            for event in black_box(script.clone()) {
                let mut event = event;
                router.handle(&mut registry, &mut event);
            }
            black_box(router.take_notifications().len());
        });
    });
}

fn router_damage_collection(c: &mut Criterion) {
    let script = scripted_events();
    let font = MonospaceFont::default();
    c.bench_function("router_damage_collection", |b| {
        b.iter(|| {
            let (mut registry, mut router) = build_session().expect("session");
            let mut tracker = DamageTracker::new();
            for event in script.iter().cloned() {
                let mut event = event;
                router.handle(&mut registry, &mut event);
                let damage = tracker.collect(&registry, &font, 4).expect("damage");
                black_box(damage.changed.len());
            }
        });
    });
}

fn build_session() -> Result<(Registry, InputRouter)> {
    let font = MonospaceFont::default();
    let mut registry = Registry::new();
    let screen = registry.open_screen(NewScreen::new(Size::new(640, 400)).with_title("Bench"));
    let window = registry.open_window(
        screen,
        NewWindow::new(Rect::new(20, 20, 240, 140))
            .with_title("Settings")
            .sizable(),
    )?;
    let owner = Owner::Window(window);
    widgets::checkbox(&mut registry, owner, 1, 4, 4, "Sound", false, &font)?;
    widgets::slider(
        &mut registry,
        owner,
        3,
        LayoutBox::absolute(Rect::new(4, 30, 160, 10)),
        Axis::Horizontal,
        16,
        0,
    )?;
    widgets::integer_field(
        &mut registry,
        owner,
        4,
        LayoutBox::absolute(Rect::new(4, 50, 80, 10)),
        0,
        6,
    )?;

    let mut config = RouterConfig {
        logger: Some(Logger::new(NullSink)),
        ..RouterConfig::default()
    };
    config.enable_metrics();
    Ok((registry, InputRouter::with_config(font, config)))
}

fn scripted_events() -> Vec<InputEvent> {
    let mut events = Vec::new();
    // Hover across the window, then click the checkbox mark.
    for x in (0..120).step_by(8) {
        events.push(InputEvent::pointer_move(x, 40));
    }
    events.push(InputEvent::pointer_down(30, 37));
    events.push(InputEvent::pointer_up(30, 37));
    // Drag the slider knob to the right.
    events.push(InputEvent::pointer_down(30, 63));
    for x in (30..180).step_by(6) {
        events.push(InputEvent::pointer_move(x, 63));
    }
    events.push(InputEvent::pointer_up(180, 63));
    // Edit the integer field and submit.
    events.push(InputEvent::pointer_down(30, 83));
    events.push(InputEvent::pointer_up(30, 83));
    for digit in ["4", "2", "7"] {
        events.push(InputEvent::text(digit));
    }
    events.push(InputEvent::key(KeyCode::Backspace, KeyModifiers::NONE));
    events.push(InputEvent::key(KeyCode::Enter, KeyModifiers::NONE));
    // Drag the window by its title bar.
    events.push(InputEvent::pointer_down(80, 24));
    for step in 0..20 {
        events.push(InputEvent::pointer_move(80 + step * 4, 24 + step * 2));
    }
    events.push(InputEvent::pointer_up(160, 64));
    events
}

criterion_group!(benches, router_pointer_script, router_damage_collection);
criterion_main!(benches);
