#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line driver for the Hush Defence simulation.
//!
//! Runs the full frame loop without a renderer: the world ticks, the
//! spawning, movement, combat, and noise systems exchange commands and
//! events, and an [`EventChannel`] fans the world's event stream out to the
//! terminal and to the session statistics. The run ends when the session is
//! won or the noise meter overwhelms.

use std::{cell::RefCell, rc::Rc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use hush_defence_board::{Board, BoardConfig, GameLevel};
use hush_defence_core::{channel::EventChannel, Command, Event, ItemKind, ItemState, Viewport};
use hush_defence_system_combat::Combat;
use hush_defence_system_movement::Movement;
use hush_defence_system_noise::Noise;
use hush_defence_system_spawning::{Config as SpawnConfig, SpawnStrategy, Spawning};
use hush_defence_world::{self as world, query, Rules, World};

/// Campaign level selected on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Level {
    /// Flat board, scripted opening spawns.
    One,
    /// Mild perspective, steady spawn cadence.
    Two,
    /// Full perspective, burst spawn cadence.
    Three,
}

impl Level {
    const fn board_level(self) -> GameLevel {
        match self {
            Self::One => GameLevel::One,
            Self::Two => GameLevel::Two,
            Self::Three => GameLevel::Three,
        }
    }

    const fn spawn_strategy(self) -> SpawnStrategy {
        match self {
            Self::One => SpawnStrategy::Intro,
            Self::Two => SpawnStrategy::Steady,
            Self::Three => SpawnStrategy::Burst,
        }
    }
}

/// Runs a Hush Defence session without a renderer.
#[derive(Debug, Parser)]
#[command(name = "hush-defence", version, about)]
struct Args {
    /// Seed for the spawn scheduler's random stream.
    #[arg(long, default_value_t = 0x4d59_5df4_d0f3_3173)]
    seed: u64,

    /// Campaign level to simulate.
    #[arg(long, value_enum, default_value = "three")]
    level: Level,

    /// Session length in seconds, overriding the level default.
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Viewport width in world units.
    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    /// Viewport height in world units.
    #[arg(long, default_value_t = 720.0)]
    height: f32,

    /// Simulated frame length in milliseconds.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Keep the hose running whenever it is ready.
    #[arg(long, default_value_t = false)]
    defend: bool,
}

#[derive(Debug, Default)]
struct SessionStats {
    spawned: u32,
    killed: u32,
    despawned: u32,
    contacts: u32,
    peak_noise: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Won,
    Overwhelmed,
}

/// Entry point for the Hush Defence command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let viewport = Viewport::new(args.width, args.height);

    let board_config = BoardConfig::for_level(args.level.board_level());
    board_config
        .validate(viewport)
        .context("board configuration rejected for the requested viewport")?;
    let board = Board::new(board_config);

    let mut rules = Rules::default();
    if let Some(secs) = args.duration_secs {
        rules.timer_duration = Duration::from_secs(secs);
    }
    let mut world = World::with_rules(rules);

    println!("{}", query::welcome_banner(&world));

    let mut spawning = Spawning::new(SpawnConfig::new(args.level.spawn_strategy(), args.seed));
    let movement = Movement::new();
    let combat = Combat::new();
    let noise = Noise::new();

    let stats = Rc::new(RefCell::new(SessionStats::default()));
    let mut channel: EventChannel<Event> = EventChannel::new();
    let sink = Rc::clone(&stats);
    let _ = channel.subscribe(move |event| {
        let mut stats = sink.borrow_mut();
        match event {
            Event::EnemySpawned { kind, lane, .. } => {
                stats.spawned += 1;
                println!("spawn: {kind:?} entering lane {lane}");
            }
            Event::EnemyDying { .. } => stats.killed += 1,
            Event::EnemyDespawned { .. } => stats.despawned += 1,
            Event::EnemyReachedPlayer { .. } => stats.contacts += 1,
            Event::SoundAdded { current, .. } => {
                stats.peak_noise = stats.peak_noise.max(*current);
            }
            Event::Overwhelmed => println!("the noise became unbearable"),
            Event::TimerFinished => println!("the night is over, clearing the street"),
            Event::GameWon => println!("the street fell silent"),
            _ => {}
        }
    });

    let dt = Duration::from_millis(args.tick_ms.max(1));
    let timer_duration = query::timer_view(&world).duration;
    // Timer, win grace, and death sequences all fit inside two extra seconds.
    let max_frames =
        (timer_duration.as_millis() / dt.as_millis()).max(1) as u64 + 2_000 / args.tick_ms.max(1) + 4;

    let mut outcome = None;
    for _ in 0..=max_frames {
        let frame_events = run_frame(
            &mut world,
            &board,
            viewport,
            dt,
            &mut spawning,
            &movement,
            &combat,
            &noise,
            args.defend,
        );
        channel.publish_all(&frame_events);

        for event in &frame_events {
            match event {
                Event::GameWon => outcome = Some(Outcome::Won),
                Event::Overwhelmed => outcome = Some(Outcome::Overwhelmed),
                _ => {}
            }
        }
        if outcome.is_some() {
            break;
        }
    }

    let stats = stats.borrow();
    let noise_view = query::noise_view(&world);
    println!(
        "session over: spawned {}, silenced {}, escaped {}, contacts {}, peak noise {}/{}",
        stats.spawned, stats.killed, stats.despawned, stats.contacts, stats.peak_noise, noise_view.max
    );
    match outcome {
        Some(Outcome::Won) => println!("outcome: the player survives the night"),
        Some(Outcome::Overwhelmed) => println!("outcome: the wife wakes up"),
        None => println!("outcome: the session never settled"),
    }
    Ok(())
}

/// Advances the simulation by one frame and returns every event it produced.
///
/// Stage order matters: the clock ticks first, then spawning reacts to the
/// fresh tick, then the collision check records enemies standing on the
/// player, then movement, combat, and noise each observe the views left
/// behind by the previous stage.
#[allow(clippy::too_many_arguments)]
fn run_frame(
    world: &mut World,
    board: &Board,
    viewport: Viewport,
    dt: Duration,
    spawning: &mut Spawning,
    movement: &Movement,
    combat: &Combat,
    noise: &Noise,
    defend: bool,
) -> Vec<Event> {
    let mut frame_events = Vec::new();

    world::apply(world, Command::Tick { dt }, &mut frame_events);
    let tick_events = frame_events.clone();

    if defend {
        drive_hose(world, &mut frame_events);
    }

    let mut spawn_commands = Vec::new();
    spawning.handle(
        &tick_events,
        &query::enemy_view(world),
        board,
        viewport,
        &mut spawn_commands,
    );
    for command in spawn_commands {
        world::apply(world, command, &mut frame_events);
    }

    for enemy in query::colliding_enemies(world, board, viewport) {
        world::apply(
            world,
            Command::RecordEnemyContact { enemy },
            &mut frame_events,
        );
    }

    let mut move_commands = Vec::new();
    movement.handle(&tick_events, &query::enemy_view(world), &mut move_commands);
    for command in move_commands {
        world::apply(world, command, &mut frame_events);
    }

    let mut kill_commands = Vec::new();
    combat.handle(
        &tick_events,
        active_item(world),
        &query::player_view(world),
        &query::enemy_view(world),
        board,
        viewport,
        &mut kill_commands,
    );
    for command in kill_commands {
        world::apply(world, command, &mut frame_events);
    }

    let mut sound_commands = Vec::new();
    noise.handle(
        &tick_events,
        &query::enemy_view(world),
        viewport,
        &mut sound_commands,
    );
    for command in sound_commands {
        world::apply(world, command, &mut frame_events);
    }

    frame_events
}

fn active_item(world: &World) -> Option<ItemKind> {
    [ItemKind::Broom, ItemKind::Hose]
        .into_iter()
        .find(|kind| query::item_view(world, *kind).state == ItemState::Using)
}

// Equip-and-fire the hose whenever the rack allows it.
fn drive_hose(world: &mut World, out_events: &mut Vec<Event>) {
    let hose = query::item_view(world, ItemKind::Hose);
    if hose.state != ItemState::Ready {
        return;
    }
    if !hose.equipped {
        world::apply(
            world,
            Command::EquipItem {
                kind: ItemKind::Hose,
            },
            out_events,
        );
    }
    if query::item_view(world, ItemKind::Hose).equipped {
        world::apply(world, Command::UseEquippedItem, out_events);
    }
}
