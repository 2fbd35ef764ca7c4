mod common;

use anyhow::Result;
use common::trace;
use vcsgym_core::{Action, Interface, Settings, demo, settings::keys};

fn scripted_actions() -> Vec<Action> {
    // A fixed but irregular pattern over the full action enumeration.
    (0..600)
        .map(|i: usize| Action::ALL[(i * 7 + i / 5) % Action::COUNT])
        .collect()
}

fn interface(seed: i64, repeat_probability: f64) -> Result<Interface> {
    let mut settings = Settings::new();
    settings.set(keys::RANDOM_SEED, seed)?;
    settings.set(keys::REPEAT_ACTION_PROBABILITY, repeat_probability)?;
    Ok(Interface::with_settings(settings))
}

#[test]
fn same_seed_same_trajectory() -> Result<()> {
    let actions = scripted_actions();
    for image in [demo::gallery_cartridge()?, demo::dodge_cartridge()?] {
        let mut a = interface(5, 0.25)?;
        let mut b = interface(5, 0.25)?;
        a.load_rom_bytes(&image)?;
        b.load_rom_bytes(&image)?;

        assert_eq!(trace(&mut a, &actions)?, trace(&mut b, &actions)?);
        assert_eq!(a.clone_state()?, b.clone_state()?);
        assert_eq!(a.ram()?, b.ram()?);
    }
    Ok(())
}

#[test]
fn replay_from_snapshot_is_bit_identical() -> Result<()> {
    let actions = scripted_actions();
    let mut ale = interface(17, 0.25)?;
    ale.load_rom_bytes(&demo::dodge_cartridge()?)?;
    trace(&mut ale, &actions[..40])?;

    let start = ale.clone_state()?;
    let first = trace(&mut ale, &actions)?;
    let first_end = ale.clone_state()?;

    ale.restore_state(&start)?;
    let second = trace(&mut ale, &actions)?;
    assert_eq!(first, second);
    assert_eq!(ale.clone_state()?, first_end);
    Ok(())
}

#[test]
fn snapshot_bytes_restore_into_a_fresh_interface() -> Result<()> {
    let actions = scripted_actions();
    let image = demo::gallery_cartridge()?;

    let mut original = interface(3, 0.0)?;
    original.load_rom_bytes(&image)?;
    trace(&mut original, &actions[..25])?;
    let bytes = original.clone_state()?.to_bytes()?;
    let expected = trace(&mut original, &actions)?;

    let mut fresh = interface(3, 0.0)?;
    fresh.load_rom_bytes(&image)?;
    fresh.restore_state(&vcsgym_core::Snapshot::from_bytes(&bytes)?)?;
    assert_eq!(fresh.frame_number()?, 25);
    assert_eq!(trace(&mut fresh, &actions)?, expected);
    Ok(())
}

#[test]
fn seeds_change_the_console_power_on_state() -> Result<()> {
    let image = demo::gallery_cartridge()?;
    let mut a = interface(1, 0.0)?;
    let mut b = interface(2, 0.0)?;
    a.load_rom_bytes(&image)?;
    b.load_rom_bytes(&image)?;
    assert_ne!(a.clone_state()?.engine_state(), b.clone_state()?.engine_state());
    Ok(())
}
