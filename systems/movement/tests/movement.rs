use std::time::Duration;

use tilewalk_core::{Command, Event, InputCode, PixelDelta, PixelPosition};
use tilewalk_system_movement::{BindingPolicy, Movement, DEFAULT_SPEED};
use tilewalk_world::{self as world, query, World};

const TICK: Duration = Duration::from_millis(16);

fn run_tick(world: &mut World, movement: &Movement, pressed: &[InputCode]) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt: TICK }, &mut events);

    let mut commands = Vec::new();
    movement.handle(&events, pressed, &mut commands);

    let mut follow_up = Vec::new();
    for command in commands {
        world::apply(world, command, &mut follow_up);
    }
    follow_up
}

fn teleport(world: &mut World, position: PixelPosition) {
    let current = query::player_position(world);
    let mut events = Vec::new();
    world::apply(
        world,
        Command::MovePlayer {
            delta: PixelDelta::new(position.x() - current.x(), position.y() - current.y()),
        },
        &mut events,
    );
}

#[test]
fn emits_exactly_one_move_per_tick() {
    let mut world = World::new();
    let movement = Movement::default();

    let events = run_tick(&mut world, &movement, &[]);

    assert_eq!(
        events,
        vec![Event::PlayerMoved {
            from: PixelPosition::ORIGIN,
            requested: PixelPosition::ORIGIN,
            to: PixelPosition::ORIGIN,
        }]
    );
}

#[test]
fn right_and_up_move_diagonally() {
    let mut world = World::new();
    teleport(&mut world, PixelPosition::new(100.0, 100.0));
    let movement = Movement::default();

    let _ = run_tick(&mut world, &movement, &[InputCode::ArrowRight, InputCode::ArrowUp]);

    assert_eq!(query::player_position(&world), PixelPosition::new(103.0, 97.0));
}

#[test]
fn arrow_and_letter_alias_double_speed_by_default() {
    let mut world = World::new();
    teleport(&mut world, PixelPosition::new(100.0, 100.0));
    let movement = Movement::default();

    let _ = run_tick(&mut world, &movement, &[InputCode::ArrowDown, InputCode::S]);

    assert_eq!(query::player_position(&world), PixelPosition::new(100.0, 106.0));
}

#[test]
fn per_direction_policy_moves_single_speed() {
    let mut world = World::new();
    teleport(&mut world, PixelPosition::new(100.0, 100.0));
    let movement = Movement::new(BindingPolicy::PerDirection, DEFAULT_SPEED);

    let _ = run_tick(&mut world, &movement, &[InputCode::ArrowDown, InputCode::S]);

    assert_eq!(query::player_position(&world), PixelPosition::new(100.0, 103.0));
}

#[test]
fn opposing_keys_at_the_edge_are_summed_before_clamping() {
    let mut world = World::new();
    let movement = Movement::default();

    let _ = run_tick(&mut world, &movement, &[InputCode::ArrowLeft, InputCode::ArrowRight]);

    assert_eq!(query::player_position(&world), PixelPosition::ORIGIN);
}

#[test]
fn holding_right_walks_to_the_edge_and_stops() {
    let mut world = World::new();
    teleport(&mut world, PixelPosition::new(220.0, 0.0));
    let movement = Movement::default();

    let _ = run_tick(&mut world, &movement, &[InputCode::D]);
    assert_eq!(query::player_position(&world).x(), 223.0);

    for _ in 0..10 {
        let _ = run_tick(&mut world, &movement, &[InputCode::D]);
    }
    assert_eq!(query::player_position(&world).x(), 224.0);
}
