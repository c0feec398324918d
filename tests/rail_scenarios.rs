//! Integration tests for the navigation rail
//!
//! These tests drive a mounted rail through user-visible scenarios on a paused
//! tokio clock, feeding timer ticks back the way the event loop does.

use eresources_nav::models::{default_items, RouteId};
use eresources_nav::rail::{
    spawn_rail, CascadeStage, CuePolicy, CueState, NavigationRail, Navigator,
    PostActivationPolicy, RailInput, RailSettings, TickReceiver, Tier, CUE_CYCLE,
    CUE_QUIET_PERIOD, STAGE1_DELAY, STAGE2_DELAY,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Routes = Arc<Mutex<Vec<RouteId>>>;

fn settings(post_activation: PostActivationPolicy, cue: CuePolicy) -> RailSettings {
    RailSettings {
        post_activation,
        cue,
    }
}

fn mount(settings: RailSettings) -> (NavigationRail<impl Navigator>, TickReceiver, Routes) {
    let routes: Routes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&routes);
    let (rail, ticks) = NavigationRail::new(default_items(), settings, move |route: &RouteId| {
        sink.lock().unwrap().push(route.clone())
    });
    (rail, ticks, routes)
}

/// Let `duration` pass on the paused clock, delivering every timer that fires
async fn advance<N: Navigator>(
    rail: &mut NavigationRail<N>,
    ticks: &mut TickReceiver,
    duration: Duration,
) {
    let deadline = tokio::time::Instant::now() + duration;
    loop {
        tokio::select! {
            biased;
            Some(tick) = ticks.recv() => {
                rail.handle(RailInput::Timer(tick));
            }
            _ = tokio::time::sleep_until(deadline) => break,
        }
    }
    // Timers due exactly at the deadline
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
    while let Ok(tick) = ticks.try_recv() {
        rail.handle(RailInput::Timer(tick));
    }
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[tokio::test(start_paused = true)]
async fn test_toggle_expands_immediately() {
    let (mut rail, _ticks, _routes) = mount(RailSettings::default());
    assert_eq!(rail.state().tier(), Tier::Collapsed);
    assert!(!rail.state().bounce_active());

    rail.handle(RailInput::ToggleClick);

    assert_eq!(rail.state().tier(), Tier::Expanded);
    assert!(rail.presentation().show_expanded());
    assert!(rail.presentation().show_icons());
}

#[tokio::test(start_paused = true)]
async fn test_idle_cascade_degrades_then_collapses() {
    let (mut rail, mut ticks, _routes) = mount(RailSettings::default());
    rail.handle(RailInput::ToggleClick);

    advance(&mut rail, &mut ticks, STAGE1_DELAY - ms(1)).await;
    assert_eq!(rail.state().tier(), Tier::Expanded);

    advance(&mut rail, &mut ticks, ms(1)).await;
    assert_eq!(rail.state().tier(), Tier::IconsOnly);
    assert!(!rail.presentation().show_expanded());
    assert!(rail.presentation().show_icons());

    advance(&mut rail, &mut ticks, STAGE2_DELAY).await;
    assert_eq!(rail.state().tier(), Tier::Collapsed);
    assert!(rail.state().bounce_active());
    assert!(rail.presentation().bounce_cue());
    assert!(!rail.presentation().show_icons());
    assert!(rail.cue().is_running());
}

#[tokio::test(start_paused = true)]
async fn test_hover_cancels_stage1_and_restarts_cascade() {
    let (mut rail, mut ticks, _routes) = mount(RailSettings::default());
    rail.handle(RailInput::ToggleClick);
    let first = rail.pending_stage().unwrap();

    advance(&mut rail, &mut ticks, ms(5_000)).await;
    rail.handle(RailInput::PointerEnter);
    let restarted = rail.pending_stage().unwrap();
    assert_eq!(restarted.stage, CascadeStage::Stage1);
    assert_ne!(restarted.generation, first.generation);

    // The first stage 1 deadline passes without effect
    advance(&mut rail, &mut ticks, ms(5_000)).await;
    assert_eq!(rail.state().tier(), Tier::Expanded);
    assert!(rail.presentation().show_expanded());

    rail.handle(RailInput::PointerLeave);
    assert_eq!(rail.state().tier(), Tier::Expanded);

    // Stage 1 is due ten seconds after the hover began
    advance(&mut rail, &mut ticks, ms(4_999)).await;
    assert_eq!(rail.state().tier(), Tier::Expanded);
    advance(&mut rail, &mut ticks, ms(1)).await;
    assert_eq!(rail.state().tier(), Tier::IconsOnly);

    advance(&mut rail, &mut ticks, STAGE2_DELAY).await;
    assert_eq!(rail.state().tier(), Tier::Collapsed);
    assert!(rail.state().bounce_active());
}

#[tokio::test(start_paused = true)]
async fn test_hover_clears_bounce_and_shows_labels() {
    let (mut rail, mut ticks, _routes) = mount(RailSettings::default());
    rail.handle(RailInput::ToggleClick);
    advance(&mut rail, &mut ticks, STAGE1_DELAY + STAGE2_DELAY).await;
    assert!(rail.state().bounce_active());

    rail.handle(RailInput::PointerEnter);

    assert!(!rail.state().bounce_active());
    assert!(rail.state().hovered());
    assert_eq!(rail.state().tier(), Tier::Collapsed);
    assert!(rail.presentation().show_expanded());
    assert!(rail.presentation().show_icons());
    assert!(!rail.presentation().bounce_cue());
    assert_eq!(rail.cue().state(), CueState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_hover_over_collapsed_rail_replays_cascade() {
    let (mut rail, mut ticks, _routes) = mount(RailSettings::default());
    rail.handle(RailInput::ToggleClick);
    advance(&mut rail, &mut ticks, STAGE1_DELAY + STAGE2_DELAY).await;
    assert_eq!(rail.state().tier(), Tier::Collapsed);

    rail.handle(RailInput::PointerEnter);
    rail.handle(RailInput::PointerLeave);
    assert!(!rail.presentation().show_icons());

    advance(&mut rail, &mut ticks, STAGE1_DELAY).await;
    assert_eq!(rail.state().tier(), Tier::IconsOnly);
    assert!(rail.presentation().show_icons());
    assert!(!rail.state().bounce_active());

    advance(&mut rail, &mut ticks, STAGE2_DELAY).await;
    assert_eq!(rail.state().tier(), Tier::Collapsed);
    assert!(rail.state().bounce_active());
    assert!(rail.cue().is_running());
}

#[tokio::test(start_paused = true)]
async fn test_activation_with_collapse_policy() {
    let (mut rail, mut ticks, routes) = mount(settings(
        PostActivationPolicy::Collapse,
        CuePolicy::Indefinite,
    ));
    rail.handle(RailInput::ToggleClick);

    rail.handle(RailInput::ItemClick(RouteId::from("/doaj")));

    assert_eq!(routes.lock().unwrap().as_slice(), &[RouteId::from("/doaj")]);
    assert_eq!(rail.state().tier(), Tier::Collapsed);
    assert!(!rail.state().bounce_active());
    assert_eq!(rail.pending_stage(), None);

    // Nothing is left to fire
    advance(&mut rail, &mut ticks, STAGE1_DELAY + STAGE2_DELAY).await;
    assert_eq!(rail.state().tier(), Tier::Collapsed);
    assert!(!rail.state().bounce_active());
    assert!(!rail.cue().is_running());
}

#[tokio::test(start_paused = true)]
async fn test_activation_with_restart_policy() {
    let (mut rail, mut ticks, routes) = mount(settings(
        PostActivationPolicy::RestartCascade,
        CuePolicy::Indefinite,
    ));
    rail.handle(RailInput::ToggleClick);
    advance(&mut rail, &mut ticks, ms(7_000)).await;

    rail.handle(RailInput::ItemClick(RouteId::from("/doab")));

    assert_eq!(routes.lock().unwrap().as_slice(), &[RouteId::from("/doab")]);
    assert_eq!(rail.state().tier(), Tier::Expanded);
    assert_eq!(
        rail.pending_stage().map(|t| t.stage),
        Some(CascadeStage::Stage1)
    );

    // The idle clock restarted at the click
    advance(&mut rail, &mut ticks, ms(3_000)).await;
    assert_eq!(rail.state().tier(), Tier::Expanded);
    advance(&mut rail, &mut ticks, ms(7_000)).await;
    assert_eq!(rail.state().tier(), Tier::IconsOnly);
}

#[tokio::test(start_paused = true)]
async fn test_rapid_activations_are_not_deduplicated() {
    let (mut rail, _ticks, routes) = mount(settings(
        PostActivationPolicy::RestartCascade,
        CuePolicy::Indefinite,
    ));
    rail.handle(RailInput::ToggleClick);

    rail.handle(RailInput::ItemClick(RouteId::from("/doaj")));
    rail.handle(RailInput::ItemClick(RouteId::from("/doaj")));
    rail.handle(RailInput::ItemClick(RouteId::from("/doab")));

    assert_eq!(
        routes.lock().unwrap().as_slice(),
        &[
            RouteId::from("/doaj"),
            RouteId::from("/doaj"),
            RouteId::from("/doab")
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_repeated_hover_restarts_cascade_each_time() {
    let (mut rail, mut ticks, _routes) = mount(RailSettings::default());
    rail.handle(RailInput::ToggleClick);
    advance(&mut rail, &mut ticks, STAGE1_DELAY + STAGE2_DELAY).await;
    assert!(rail.cue().is_running());

    let mut generations = Vec::new();
    for _ in 0..3 {
        advance(&mut rail, &mut ticks, ms(6_000)).await;
        rail.handle(RailInput::PointerEnter);
        assert!(rail.state().hovered());
        assert!(!rail.cue().is_running());
        generations.push(rail.pending_stage().unwrap().generation);
    }
    generations.dedup();
    assert_eq!(generations.len(), 3);

    // Twelve seconds into the hover, stage 1 has never fired
    assert_eq!(rail.state().tier(), Tier::Collapsed);
    assert_eq!(
        rail.pending_stage().map(|t| t.stage),
        Some(CascadeStage::Stage1)
    );
}

#[tokio::test(start_paused = true)]
async fn test_inputs_while_bouncing_keep_one_cue() {
    let (mut rail, mut ticks, _routes) = mount(RailSettings::default());
    rail.handle(RailInput::ToggleClick);
    advance(&mut rail, &mut ticks, STAGE1_DELAY + STAGE2_DELAY).await;

    let started = rail.cue().state();
    assert!(matches!(started, CueState::Bouncing { .. }));

    rail.handle(RailInput::PointerLeave);
    rail.handle(RailInput::ItemClick(RouteId::from("/nowhere")));
    advance(&mut rail, &mut ticks, ms(30_000)).await;

    assert_eq!(rail.cue().state(), started);
    assert_eq!(rail.cue().pending(), None);
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_rests_and_resumes() {
    let (mut rail, mut ticks, _routes) = mount(settings(
        PostActivationPolicy::Collapse,
        CuePolicy::Heartbeat { repeats: 3 },
    ));
    rail.handle(RailInput::ToggleClick);
    advance(&mut rail, &mut ticks, STAGE1_DELAY + STAGE2_DELAY).await;
    assert!(matches!(rail.cue().state(), CueState::Bouncing { .. }));

    advance(&mut rail, &mut ticks, CUE_CYCLE * 3).await;
    assert_eq!(rail.cue().state(), CueState::Resting);
    // The bounce flag itself stays armed between bursts
    assert!(rail.state().bounce_active());

    advance(&mut rail, &mut ticks, CUE_QUIET_PERIOD).await;
    assert!(matches!(rail.cue().state(), CueState::Bouncing { .. }));

    rail.handle(RailInput::ToggleClick);
    assert_eq!(rail.cue().state(), CueState::Idle);
    assert_eq!(rail.cue().pending(), None);
}

#[derive(Debug, Clone)]
enum Event {
    Input(RailInput),
    Wait(Duration),
}

fn alphabet() -> Vec<Event> {
    vec![
        Event::Input(RailInput::PointerEnter),
        Event::Input(RailInput::PointerLeave),
        Event::Input(RailInput::ToggleClick),
        Event::Input(RailInput::ItemClick(RouteId::from("/doaj"))),
        Event::Wait(ms(3_000)),
        Event::Wait(ms(6_000)),
    ]
}

fn check_invariants<N: Navigator>(rail: &NavigationRail<N>, history: &[Event]) {
    let state = rail.state();
    assert!(
        !state.bounce_active() || state.tier() == Tier::Collapsed,
        "bounce outside collapsed after {:?}",
        history
    );
    if let Some(tick) = rail.pending_stage() {
        if tick.stage == CascadeStage::Stage2 {
            assert!(
                state.tier() <= Tier::IconsOnly,
                "stage 2 pending on {:?} after {:?}",
                state.tier(),
                history
            );
        }
    }
    assert_eq!(
        rail.cue().is_running(),
        rail.presentation().bounce_cue(),
        "cue out of step with the bounce flag after {:?}",
        history
    );
}

#[tokio::test(start_paused = true)]
async fn test_invariants_hold_for_all_short_sequences() {
    let alphabet = alphabet();
    let length = 4;
    let combinations = alphabet.len().pow(length);

    let policies = [
        PostActivationPolicy::Collapse,
        PostActivationPolicy::RestartCascade,
    ];
    let cues = [CuePolicy::Indefinite, CuePolicy::Heartbeat { repeats: 2 }];

    for policy in policies {
        for cue in cues {
            for mut index in 0..combinations {
                // Start from a bouncing rail so every tier is reachable
                let (mut rail, mut ticks, _routes) = mount(settings(policy, cue));
                rail.handle(RailInput::ToggleClick);
                advance(&mut rail, &mut ticks, STAGE1_DELAY + STAGE2_DELAY).await;
                check_invariants(&rail, &[]);

                let mut history = Vec::new();
                for _ in 0..length {
                    let event = alphabet[index % alphabet.len()].clone();
                    index /= alphabet.len();
                    history.push(event.clone());

                    match event {
                        Event::Input(input) => {
                            rail.handle(input);
                        }
                        Event::Wait(duration) => {
                            advance(&mut rail, &mut ticks, duration).await;
                        }
                    }
                    check_invariants(&rail, &history);
                }
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_event_loop_end_to_end() {
    let routes: Routes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&routes);
    let rail = spawn_rail(
        default_items(),
        settings(PostActivationPolicy::RestartCascade, CuePolicy::Indefinite),
        move |route: &RouteId| sink.lock().unwrap().push(route.clone()),
    );
    let mut snapshots = rail.subscribe();

    rail.toggle().unwrap();
    snapshots.changed().await.unwrap();
    assert_eq!(snapshots.borrow_and_update().state.tier(), Tier::Expanded);

    tokio::time::sleep(STAGE1_DELAY + STAGE2_DELAY).await;
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
    assert!(rail.snapshot().state.bounce_active());

    rail.pointer_enter().unwrap();
    rail.select(RouteId::from("/doaj")).unwrap();
    rail.pointer_leave().unwrap();
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }

    let snapshot = rail.snapshot();
    assert_eq!(snapshot.state.tier(), Tier::Collapsed);
    assert!(!snapshot.state.bounce_active());
    assert!(!snapshot.state.hovered());
    assert_eq!(routes.lock().unwrap().as_slice(), &[RouteId::from("/doaj")]);

    rail.unmount().await.unwrap();
}
