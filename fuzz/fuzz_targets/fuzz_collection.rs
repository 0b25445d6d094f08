// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Stored blobs must never panic the decoder, and any sequence of gestures
//! must keep the pin limit and the pinned prefix.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pingallery::collection::{Collection, ImageRecord, PIN_LIMIT};
use pingallery::persistence::{decode, encode};

#[derive(Arbitrary, Debug)]
enum Gesture {
    Add(u8),
    Remove(u8),
    TogglePin(u8),
    Caption(u8, String),
    Reorder(Vec<u8>),
}

#[derive(Arbitrary, Debug)]
struct Input {
    blob: String,
    gestures: Vec<Gesture>,
}

fuzz_target!(|input: Input| {
    if let Ok(decoded) = decode(&input.blob) {
        let current: Vec<ImageRecord> = decoded.records.into_iter().filter_map(|r| r.into_current()).collect();
        let collection = Collection::from_records(current);
        assert!(collection.pinned_count() <= PIN_LIMIT);
        let _ = encode(collection.records());
    }

    let mut collection = Collection::new();
    let mut next = 0u32;
    for gesture in input.gestures {
        let ids = collection.ids();
        let pick = |n: u8| ids.get(n as usize % ids.len().max(1)).cloned().unwrap_or_default();
        match gesture {
            Gesture::Add(count) => {
                let batch = (0..count % 8)
                    .map(|_| {
                        next += 1;
                        ImageRecord::new(format!("id{next}"), format!("id{next}.jpg"))
                    })
                    .collect();
                collection.add_batch(batch);
            }
            Gesture::Remove(n) => {
                collection.remove(&pick(n));
            }
            Gesture::TogglePin(n) => {
                collection.toggle_pin(&pick(n));
            }
            Gesture::Caption(n, text) => {
                collection.set_caption(&pick(n), text);
            }
            Gesture::Reorder(order) => {
                let ids: Vec<String> = order.into_iter().map(pick).collect();
                let _ = collection.reorder(&ids);
            }
        }

        assert!(collection.pinned_count() <= PIN_LIMIT);
        let first_unpinned = collection.records().iter().position(|r| !r.pinned).unwrap_or(collection.len());
        assert!(collection.records()[first_unpinned..].iter().all(|r| !r.pinned));
    }
});
