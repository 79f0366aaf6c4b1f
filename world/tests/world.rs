use std::time::Duration;

use tilewalk_core::{Command, Direction, Event, PixelDelta, PixelPosition, SpriteSize};
use tilewalk_world::{self as world, query, Level, LevelDescriptor, LevelError, World};

fn move_player(world: &mut World, delta: PixelDelta) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::MovePlayer { delta }, &mut events);
    events
}

fn place_player(world: &mut World, position: PixelPosition) {
    let current = query::player_position(world);
    let _ = move_player(
        world,
        PixelDelta::new(position.x() - current.x(), position.y() - current.y()),
    );
    assert_eq!(query::player_position(world), position);
}

#[test]
fn pressing_left_at_origin_keeps_player_in_place() {
    let mut world = World::new();
    let _ = move_player(&mut world, Direction::Left.delta(3.0));

    assert_eq!(query::player_position(&world), PixelPosition::ORIGIN);
}

#[test]
fn right_edge_clamps_on_second_step() {
    let mut world = World::new();
    place_player(&mut world, PixelPosition::new(220.0, 0.0));

    let _ = move_player(&mut world, Direction::Right.delta(3.0));
    assert_eq!(query::player_position(&world), PixelPosition::new(223.0, 0.0));

    let events = move_player(&mut world, Direction::Right.delta(3.0));
    assert_eq!(query::player_position(&world), PixelPosition::new(224.0, 0.0));
    assert_eq!(
        events,
        vec![Event::PlayerMoved {
            from: PixelPosition::new(223.0, 0.0),
            requested: PixelPosition::new(226.0, 0.0),
            to: PixelPosition::new(224.0, 0.0),
        }]
    );
}

#[test]
fn diagonal_moves_apply_both_axes() {
    let mut world = World::new();
    place_player(&mut world, PixelPosition::new(100.0, 100.0));

    let _ = move_player(
        &mut world,
        Direction::Right.delta(3.0).plus(Direction::Up.delta(3.0)),
    );

    assert_eq!(query::player_position(&world), PixelPosition::new(103.0, 97.0));
}

#[test]
fn player_never_leaves_the_screen() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigurePlayerSprite {
            size: SpriteSize::new(16, 24),
        },
        &mut events,
    );

    let pattern = [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Right,
        Direction::Down,
        Direction::Down,
        Direction::Down,
    ];
    let mut state: u32 = 0x2545_f491;
    for step in 0..2_000 {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let direction = pattern[(state as usize + step) % pattern.len()];
        let distance = (state % 97) as f32;
        let _ = move_player(&mut world, direction.delta(distance));

        let position = query::player_position(&world);
        assert!(position.x() >= 0.0 && position.x() <= 240.0 - 16.0);
        assert!(position.y() >= 0.0 && position.y() <= 240.0 - 24.0);
    }
}

#[test]
fn ticks_are_counted() {
    let mut world = World::new();
    let mut events = Vec::new();
    let dt = Duration::from_secs_f64(1.0 / 60.0);
    world::apply(&mut world, Command::Tick { dt }, &mut events);
    world::apply(&mut world, Command::Tick { dt }, &mut events);

    assert_eq!(query::tick_index(&world), 2);
    assert_eq!(events.last(), Some(&Event::TimeAdvanced { dt, tick: 2 }));
}

#[test]
fn default_world_shows_the_mailbox_level() {
    let world = World::new();

    assert_eq!(query::tile_layers(&world).len(), 2);
    assert_eq!(query::sheet_layout(&world).columns(), 25);
    assert_eq!(query::sheet_layout(&world).tile_size(), 16);
    assert_eq!(query::level(&world).screen_columns(), 15);
    assert_eq!(query::solid_mask(&world).solid_cells().count(), 34);
}

#[test]
fn level_descriptor_parses_from_toml() {
    let contents = r#"
        screen_columns = 2
        layers = [[243, 243, 243, 243], [0, 26, 0, 0]]
        solid = [0, 1, 0, 0]
    "#;
    let descriptor: LevelDescriptor = toml::from_str(contents).expect("descriptor should parse");
    let level = Level::from_descriptor(descriptor).expect("descriptor should validate");

    assert_eq!(level.tile_size(), 16);
    assert_eq!(level.sheet().columns(), 25);
    assert_eq!(level.layers().len(), 2);
    assert_eq!(level.solid().solid_cells().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn level_descriptor_with_short_mask_is_rejected() {
    let contents = r#"
        screen_columns = 2
        layers = [[243, 243, 243, 243]]
        solid = [0, 1]
    "#;
    let descriptor: LevelDescriptor = toml::from_str(contents).expect("descriptor should parse");

    assert_eq!(
        Level::from_descriptor(descriptor),
        Err(LevelError::LayerLengthMismatch {
            layer: 0,
            expected: 2,
            actual: 4,
        })
    );
}
