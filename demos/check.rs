use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use lts_rs::composition::{interleave, interleave_reduced};
use lts_rs::scc::tarjan;
use lts_rs::simulation::{full_relation, maximum_bisimulation, maximum_simulation};
use lts_rs::{Construction, Fa, Lts};

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Explore only reachable states, or the whole state space.
    #[clap(long, value_enum, default_value = "reachable")]
    construction: Mode,

    /// Print debug logs.
    #[clap(short, long)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Strong and weak simulation between two vending machines.
    Simulation {
        /// Symbol treated as internal for the weak relation.
        #[arg(long, value_name = "SYMBOL", default_value = "m")]
        tau: char,
    },
    /// Interleaving of two cyclic components synchronising on `s`.
    Interleave {
        /// Expand only the last local component.
        #[clap(long)]
        reduce: bool,
    },
    /// Subset construction followed by minimisation of `(a|b)*abb`.
    Minimize,
    /// Language conformance of an implementation against a specification.
    Conformance,
    /// Strongly connected components of a small graph.
    Scc,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Reachable,
    Full,
}

impl From<Mode> for Construction {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Reachable => Construction::Reachable,
            Mode::Full => Construction::Full,
        }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        if args.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();
    println!("args = {:?}", args);

    let construction = Construction::from(args.construction);
    match args.command {
        Command::Simulation { tau } => simulation(tau)?,
        Command::Interleave { reduce } => interleaving(reduce)?,
        Command::Minimize => minimization(construction)?,
        Command::Conformance => conformance(construction)?,
        Command::Scc => components(),
    }

    info!("Done in {:.3} s", time_total.elapsed().as_secs_f64());
    Ok(())
}

fn simulation(tau: char) -> color_eyre::Result<()> {
    let a = Lts::new([1, 2, 3, 4], [1], ['p', 'd', 'm'], [(1, 'p', 2), (2, 'd', 3), (2, 'm', 4)])?;
    let b = Lts::new(
        [5, 6, 7, 8, 9],
        [5],
        ['p', 'd', 'm'],
        [(5, 'p', 6), (5, 'p', 7), (6, 'd', 8), (7, 'm', 9)],
    )?;
    println!("A = {}", a);
    println!("B = {}", b);

    for (name, tau) in [("strong", vec![]), ("weak", vec![tau])] {
        let mut sim: Vec<_> = maximum_simulation(&b, &a, &full_relation(&b, &a), &tau).into_iter().collect();
        sim.sort();
        println!("{} simulation of B by A: {:?}", name, sim);
        println!("A {} simulates B: {}", name, a.simulates(&b, &tau));
        println!("B {} simulates A: {}", name, b.simulates(&a, &tau));
    }

    let mut bisim: Vec<_> = maximum_bisimulation(&a, &b, &full_relation(&a, &b), &[]).into_iter().collect();
    bisim.sort();
    println!("bisimulation: {:?}", bisim);
    println!("A ~ B: {}", a.bisimulates(&b, &[]));
    Ok(())
}

fn interleaving(reduce: bool) -> color_eyre::Result<()> {
    let a = Lts::new([1, 2, 3, 4], [1], ['a', 'b', 'c', 's'], [(1, 'a', 2), (2, 'b', 3), (3, 'c', 4), (4, 's', 1)])?;
    let b = Lts::new([5, 6, 7, 8], [5], ['d', 'e', 'f', 's'], [(5, 'd', 6), (6, 'e', 7), (7, 'f', 8), (8, 's', 5)])?;

    let composed = if reduce {
        interleave_reduced(&[&a, &b], &|local: &[usize]| local.last().copied().into_iter().collect::<Vec<_>>())?
    } else {
        interleave(&[&a, &b])?
    };
    println!("{}", composed);
    println!(
        "states = {}, transitions = {}",
        composed.num_states(),
        composed.num_transitions()
    );
    Ok(())
}

fn minimization(construction: Construction) -> color_eyre::Result<()> {
    let fa = Fa::new(
        [1, 2, 3, 4],
        [1],
        ['a', 'b'],
        [(1, 'a', 1), (1, 'b', 1), (1, 'a', 2), (2, 'b', 3), (3, 'b', 4)],
        [4],
    )?;
    println!("FA = {}", fa);

    let dfa = fa.power(construction);
    println!("power: {} states", dfa.num_states());
    let min = dfa.minimize()?;
    println!("minimized = {}", min);

    for length in 0..=6 {
        println!("words of length {}: {}", length, min.count_words(length));
    }
    Ok(())
}

fn conformance(construction: Construction) -> color_eyre::Result<()> {
    let implementation = Fa::new(
        [1, 2, 3, 4],
        [1],
        ['a', 'b'],
        [(1, 'b', 2), (2, 'b', 3), (2, 'b', 4), (3, 'a', 1), (3, 'b', 3), (4, 'b', 3)],
        [4],
    )?;
    let spec = Fa::new(
        ['A', 'B', 'C', 'D'],
        ['A'],
        ['a', 'b'],
        [
            ('A', 'a', 'C'),
            ('A', 'a', 'D'),
            ('A', 'b', 'A'),
            ('A', 'b', 'B'),
            ('B', 'a', 'D'),
            ('B', 'b', 'C'),
            ('C', 'a', 'C'),
            ('C', 'a', 'D'),
            ('D', 'b', 'A'),
        ],
        ['B'],
    )?;

    let result = implementation.conforms(&spec, construction)?;
    println!("conforms = {}", result.holds);
    println!(
        "checker: {} states, {} transitions",
        result.checker.num_states(),
        result.checker.num_transitions()
    );
    for trace in &result.counterexamples {
        let word: String = trace.iter().map(|(_, a, _)| *a).collect();
        println!("counterexample: {:?} via {:?}", word, trace);
    }
    Ok(())
}

fn components() {
    let nodes = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J'];
    let edges = [
        ('A', 'B'),
        ('B', 'D'),
        ('D', 'A'),
        ('D', 'E'),
        ('E', 'H'),
        ('H', 'I'),
        ('I', 'E'),
        ('C', 'F'),
        ('F', 'G'),
        ('G', 'J'),
        ('J', 'C'),
        ('B', 'C'),
    ];
    for component in tarjan(&nodes, &edges) {
        println!("{:?}", component);
    }
}
