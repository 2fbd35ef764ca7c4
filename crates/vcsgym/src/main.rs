use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use vcsgym_core::{Action, ActionSet, Interface, demo, settings::keys};
use vcsgym_support::{checkpoint, movie::Movie};

/// Frame-stepped agent runner for VCS-8 cartridges
#[derive(Parser, Debug)]
#[command(name = "vcsgym", version)]
#[command(about = "Run agents against VCS-8 cartridges", long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play episodes of a cartridge and print each episode's return.
    Run(RunArgs),
    /// Write the built-in cartridges into a directory.
    Demo {
        /// Output directory (created if missing)
        dir: PathBuf,
    },
    /// Replay a recorded movie twice and check both runs agree.
    ///
    /// The stepping flags must match the ones the movie was recorded with.
    Verify {
        /// Cartridge the movie was recorded on
        rom: PathBuf,
        /// Movie file written by `run --record`
        movie: PathBuf,
        #[command(flatten)]
        stepping: SteppingArgs,
    },
}

/// Settings latched when the cartridge loads.
#[derive(clap::Args, Debug)]
struct SteppingArgs {
    /// Frame cap per episode; 0 disables it
    #[arg(long, default_value_t = 18_000)]
    max_frames: i64,

    /// Extra `key=value` settings, applied after the flags above
    #[arg(long = "set", value_name = "KEY=VALUE")]
    settings: Vec<String>,
}

impl SteppingArgs {
    fn apply(&self, ale: &mut Interface) -> anyhow::Result<()> {
        ale.set_setting(keys::MAX_NUM_FRAMES_PER_EPISODE, self.max_frames)?;
        for pair in &self.settings {
            let Some((key, value)) = pair.split_once('=') else {
                bail!("expected KEY=VALUE, got `{pair}`");
            };
            ale.set_setting_from_str(key.trim(), value)?;
        }
        Ok(())
    }
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Cartridge image
    rom: PathBuf,

    /// Number of episodes to play
    #[arg(short, long, default_value_t = 1)]
    episodes: u32,

    #[arg(short, long, value_enum, default_value_t = Agent::Random)]
    agent: Agent,

    /// Seeds the console and, for the random agent, its action choice
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    #[command(flatten)]
    stepping: SteppingArgs,

    /// Record the first episode as a movie
    #[arg(long)]
    record: Option<PathBuf>,

    /// Write a checkpoint of the final state
    #[arg(long)]
    checkpoint: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Agent {
    Noop,
    Fire,
    Random,
}

impl Agent {
    /// Fixed agents can stall a title forever, so they need a frame cap.
    fn check_frame_cap(self, max_frames: i64) -> anyhow::Result<()> {
        if max_frames == 0 && !matches!(self, Agent::Random) {
            bail!("--max-frames 0 needs the random agent; {self:?} may never end an episode");
        }
        Ok(())
    }

    fn choose(self, minimal: &ActionSet, rng: &mut StdRng) -> Action {
        match self {
            Agent::Noop => Action::Noop,
            Agent::Fire => Action::Fire,
            Agent::Random => minimal
                .get(rng.random_range(0..minimal.len().max(1)))
                .unwrap_or_default(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Run(run_args) => run(run_args),
        Command::Demo { dir } => write_demos(&dir),
        Command::Verify {
            rom,
            movie,
            stepping,
        } => verify(&rom, &movie, &stepping),
    }
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    info!("{}", vcsgym_core::welcome_message());

    let mut ale = Interface::new();
    ale.set_setting(keys::RANDOM_SEED, args.seed as i64)?;
    args.stepping.apply(&mut ale)?;
    args.agent
        .check_frame_cap(ale.settings().get_int(keys::MAX_NUM_FRAMES_PER_EPISODE)?)?;
    ale.load_rom(&args.rom)
        .with_context(|| format!("loading {}", args.rom.display()))?;

    let minimal = ale.minimal_action_set()?.clone();
    info!(
        title = ale.title_name()?,
        actions = %minimal.iter().map(|a| a.name()).collect::<Vec<_>>().join(","),
        "playing"
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut recording: Option<Movie> = None;
    for episode in 0..args.episodes {
        if episode > 0 {
            ale.reset_game()?;
        }
        if episode == 0 && args.record.is_some() {
            recording = Some(Movie {
                start: ale.clone_state()?,
                actions: Vec::new(),
            });
        }

        let mut total: i64 = 0;
        let start_frame = ale.frame_number()?;
        while !ale.game_over()? {
            let action = args.agent.choose(&minimal, &mut rng);
            if let Some(movie) = recording.as_mut().filter(|_| episode == 0) {
                movie.actions.push(action);
            }
            total += i64::from(ale.act(action)?);
        }
        println!(
            "episode {}: return {}, frames {}, lives {}",
            episode + 1,
            total,
            ale.frame_number()? - start_frame,
            ale.lives()?.map_or_else(|| "-".to_string(), |l| l.to_string())
        );
    }

    if let (Some(path), Some(movie)) = (&args.record, &recording) {
        fs::write(path, movie.to_bytes()?)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), frames = movie.len(), "movie recorded");
    }
    if let Some(path) = &args.checkpoint {
        checkpoint::save_to_file(path, &ale.clone_state()?)?;
        info!(path = %path.display(), "checkpoint written");
    }
    Ok(())
}

fn write_demos(dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    for (tag, build) in demo::CARTRIDGES {
        let path = dir.join(format!("{}.vcs", tag.to_ascii_lowercase()));
        fs::write(&path, build()?).with_context(|| format!("writing {}", path.display()))?;
        println!("{}", path.display());
    }
    Ok(())
}

fn verify(rom: &Path, movie_path: &Path, stepping: &SteppingArgs) -> anyhow::Result<()> {
    let movie = Movie::from_bytes(
        &fs::read(movie_path).with_context(|| format!("reading {}", movie_path.display()))?,
    )?;
    let mut ale = Interface::new();
    stepping.apply(&mut ale)?;
    ale.load_rom(rom)
        .with_context(|| format!("loading {}", rom.display()))?;
    let report = movie.verify(&mut ale)?;
    println!(
        "replay ok: {} frames, return {}, terminal {}",
        movie.len(),
        report.total_reward(),
        report.terminals.last().copied().unwrap_or(false)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(argv: &[&str]) -> RunArgs {
        match Args::try_parse_from(argv).expect("parse").command {
            Command::Run(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn fixed_agents_need_a_frame_cap() {
        let args = run_args(&["vcsgym", "run", "g.vcs", "--agent", "noop", "--max-frames", "0"]);
        assert!(args.agent.check_frame_cap(args.stepping.max_frames).is_err());
        assert!(Agent::Fire.check_frame_cap(0).is_err());
        assert!(Agent::Noop.check_frame_cap(100).is_ok());
        assert!(Agent::Random.check_frame_cap(0).is_ok());
    }

    #[test]
    fn verify_takes_the_recording_flags() {
        let parsed = Args::try_parse_from([
            "vcsgym", "verify", "d.vcs", "d.movie", "--set", "repeat_action_probability=0.25",
        ])
        .expect("parse");
        let Command::Verify { stepping, .. } = parsed.command else {
            panic!("expected verify");
        };
        assert_eq!(stepping.max_frames, 18_000);

        let mut ale = Interface::new();
        stepping.apply(&mut ale).expect("apply");
        assert_eq!(
            ale.settings()
                .get_float(keys::REPEAT_ACTION_PROBABILITY)
                .expect("setting"),
            0.25
        );
    }
}
