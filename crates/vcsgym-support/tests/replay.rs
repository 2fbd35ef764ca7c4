use anyhow::Result;
use proptest::prelude::*;
use vcsgym_core::{Action, Interface, demo, settings::keys};
use vcsgym_support::{checkpoint, movie::Movie};

fn interface(image: &[u8], seed: i64, repeat_probability: f64) -> Interface {
    let mut ale = Interface::new();
    ale.set_setting(keys::RANDOM_SEED, seed).expect("seed");
    ale.set_setting(keys::REPEAT_ACTION_PROBABILITY, repeat_probability)
        .expect("probability");
    ale.load_rom_bytes(image).expect("load");
    ale
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn sticky_replay_matches_recording(
        seed in 0i64..10_000,
        warmup in 0usize..60,
        picks in prop::collection::vec(0usize..Action::COUNT, 1..240),
        dodge in any::<bool>(),
    ) {
        let build = if dodge { demo::dodge_cartridge } else { demo::gallery_cartridge };
        let image = build().expect("cartridge");
        let mut ale = interface(&image, seed, 0.25);
        for _ in 0..warmup {
            ale.act(Action::Fire).expect("act");
        }

        let actions: Vec<Action> = picks.iter().filter_map(|&i| Action::from_index(i)).collect();
        let (movie, recorded) = Movie::record(&mut ale, &actions).expect("record");
        let replayed = movie.verify(&mut ale).expect("verify");

        prop_assert_eq!(recorded.first_divergence(&replayed), None);
        prop_assert_eq!(&recorded, &replayed);
    }

    #[test]
    fn persisted_checkpoint_resumes_identically(
        seed in 0i64..10_000,
        picks in prop::collection::vec(0usize..Action::COUNT, 1..120),
    ) {
        let image = demo::gallery_cartridge().expect("cartridge");
        let actions: Vec<Action> = picks.iter().filter_map(|&i| Action::from_index(i)).collect();

        let mut original = interface(&image, seed, 0.0);
        let bytes = checkpoint::encode(&original.clone_state().expect("snapshot")).expect("encode");
        let (_, expected) = Movie::record(&mut original, &actions).expect("record");

        let mut other = interface(&image, seed.wrapping_add(1), 0.0);
        let movie = Movie {
            start: checkpoint::decode(&bytes).expect("decode"),
            actions,
        };
        let replayed = movie.replay(&mut other).expect("replay");
        prop_assert_eq!(expected, replayed);
    }
}

#[test]
fn movie_from_other_cartridge_is_refused() -> Result<()> {
    let mut gallery = interface(&demo::gallery_cartridge()?, 0, 0.0);
    let (movie, _) = Movie::record(&mut gallery, &[Action::Fire; 3])?;

    let mut dodge = interface(&demo::dodge_cartridge()?, 0, 0.0);
    let err = movie.replay(&mut dodge).expect_err("mismatch");
    assert!(matches!(
        err,
        vcsgym_support::Error::Core(vcsgym_core::Error::StateMismatch { .. })
    ));
    Ok(())
}

#[test]
fn sticky_movie_is_refused_without_sticky_actions() -> Result<()> {
    let image = demo::dodge_cartridge()?;
    let actions: Vec<Action> = (0..300)
        .map(|i| if i % 7 < 3 { Action::Left } else { Action::Right })
        .collect();
    let mut recorder = interface(&image, 5, 0.25);
    let (movie, _) = Movie::record(&mut recorder, &actions)?;

    let mut plain = interface(&image, 5, 0.0);
    let err = movie.verify(&mut plain).expect_err("mismatch");
    assert!(matches!(
        err,
        vcsgym_support::Error::Core(vcsgym_core::Error::StateMismatch { .. })
    ));
    Ok(())
}

#[test]
fn fire_movie_reaches_game_over() -> Result<()> {
    let mut ale = interface(&demo::gallery_cartridge()?, 1, 0.0);
    let (movie, report) = Movie::record(&mut ale, &[Action::Fire; 400])?;
    assert!(report.terminals.last().copied().unwrap_or(false));
    let first_terminal = report
        .terminals
        .iter()
        .position(|&t| t)
        .expect("terminal frame");
    assert!(report.terminals[first_terminal..].iter().all(|&t| t));
    assert_eq!(movie.verify(&mut ale)?.total_reward(), report.total_reward());
    Ok(())
}
