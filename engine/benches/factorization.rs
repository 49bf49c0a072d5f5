// Copyright (C) 2020 Kevin Del Castillo Ramírez
//
// This file is part of engine.
//
// engine is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// engine is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with engine.  If not, see <http://www.gnu.org/licenses/>.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use engine::{Hyperparameters, Interactions, Loss, Recommender};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn generate_interactions(num_users: usize, num_items: usize, size: usize) -> Interactions {
    let mut rng = StdRng::seed_from_u64(42);
    let mut interactions = Interactions::new(num_users, num_items);

    for _ in 0..size {
        let user_idx = rng.gen_range(0, num_users);
        let item_idx = rng.gen_range(0, num_items);
        let weight = if rng.gen_bool(0.8) { 1.0 } else { -1.0 };

        // Indices are always in range
        let _ = interactions.push(user_idx, item_idx, weight);
    }

    interactions
}

fn fit_with(c: &mut Criterion, name: &str, loss: Loss) {
    let interactions = generate_interactions(1000, 2000, 20_000);

    c.bench_function(name, |bench| {
        bench.iter(|| {
            let mut model = Hyperparameters::new().loss(loss).build().unwrap();
            model.fit(black_box(&interactions), 1).unwrap()
        })
    });
}

fn fit_warp_20_000(c: &mut Criterion) {
    fit_with(c, "fit warp 20000", Loss::Warp);
}

fn fit_bpr_20_000(c: &mut Criterion) {
    fit_with(c, "fit bpr 20000", Loss::Bpr);
}

fn fit_logistic_20_000(c: &mut Criterion) {
    fit_with(c, "fit logistic 20000", Loss::Logistic);
}

fn recommend_2000_items(c: &mut Criterion) {
    let interactions = generate_interactions(1000, 2000, 20_000);
    let mut model = Hyperparameters::new().build().unwrap();
    model.fit(&interactions, 1).unwrap();

    let items: Vec<_> = (0..2000).collect();
    c.bench_function("recommend 2000 items", |bench| {
        bench.iter(|| model.recommend(black_box(7), &items, 10).unwrap())
    });
}

criterion_group! {
    name = fitting;
    config = Criterion::default().sample_size(10);
    targets = fit_warp_20_000, fit_bpr_20_000, fit_logistic_20_000
}

criterion_group! {
    name = scoring;
    config = Criterion::default();
    targets = recommend_2000_items
}

criterion_main!(fitting, scoring);
