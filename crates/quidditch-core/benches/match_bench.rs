use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quidditch_core::{simulate_many, JsonRoster, MatchConfig, PhraseBook, RosterSource, Simulation};

fn bench_full_match(c: &mut Criterion) {
    let roster = JsonRoster::bundled().expect("bundled roster");
    let (home, away) = roster
        .load_teams("Hogwarts Hawks", "Durmstrang Dragons")
        .expect("bundled teams");
    let phrases = PhraseBook::standard();

    c.bench_function("full_match", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed += 1;
            let mut sim = Simulation::new(
                home.clone(),
                away.clone(),
                phrases.clone(),
                MatchConfig::default(),
                black_box(seed),
            )
            .expect("valid config");
            black_box(sim.run_to_end().expect("match runs"))
        })
    });
}

fn bench_batch(c: &mut Criterion) {
    let roster = JsonRoster::bundled().expect("bundled roster");
    let (home, away) = roster
        .load_teams("Hogwarts Hawks", "Durmstrang Dragons")
        .expect("bundled teams");
    let phrases = PhraseBook::standard();
    let config = MatchConfig::default();
    // 64 matches per iteration keeps the rayon pool busy without dominating
    let seeds: Vec<u64> = (0..64).collect();

    c.bench_function("batch_64", |b| {
        b.iter(|| black_box(simulate_many(&home, &away, &phrases, &config, &seeds).expect("batch runs")))
    });
}

criterion_group!(benches, bench_full_match, bench_batch);
criterion_main!(benches);
