// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Fan-out/fan-in probing of a batch of audio files.
//!
//! A fixed number of worker threads share a queue of path indices. Each
//! worker claims the next index, probes the file and sends the outcome back
//! on a result channel. The collector writes every outcome into a slot
//! preallocated for its original index, so the returned metadata is always
//! in request order however the probes happen to complete.
//!
//! The first failure observed by the collector fails the whole batch. A
//! shared flag then stops workers from claiming anything further; probes
//! already running are left to finish and their results are dropped.

use std::{
    path::Path,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, Sender},
    },
    thread,
};

use tracing::{debug, warn};

use crate::{error::ProbeError, model::TrackMeta, probe::Prober};

/// Number of probe workers, regardless of batch size.
pub const WORKER_COUNT: usize = 4;

/// The outcome of probing one path, as reported by a worker.
struct ProbeResult {
    index: usize,
    title: String,
    duration: Result<f64, ProbeError>,
}

/// Probes every path and returns the metadata in the order given.
///
/// # Errors
///
/// Returns the first [`ProbeError`] the collector receives. Later failures
/// and successes from the same batch are discarded.
pub fn probe_all(prober: &dyn Prober, paths: &[String]) -> Result<Vec<TrackMeta>, ProbeError> {
    if paths.is_empty() {
        return Ok(vec![]);
    }

    let (job_tx, job_rx) = mpsc::channel();
    for index in 0..paths.len() {
        let _ = job_tx.send(index);
    }
    drop(job_tx);

    let job_rx = Mutex::new(job_rx);
    let cancelled = AtomicBool::new(false);
    let (result_tx, result_rx) = mpsc::channel();

    thread::scope(|scope| {
        for worker in 0..WORKER_COUNT {
            let job_rx = &job_rx;
            let result_tx = result_tx.clone();
            let cancelled = &cancelled;

            scope.spawn(move || run_worker(worker, prober, paths, job_rx, &result_tx, cancelled));
        }
        drop(result_tx);

        let collected = collect_results(paths, result_rx);
        if collected.is_err() {
            cancelled.store(true, Ordering::Relaxed);
        }
        collected
    })
}

fn run_worker(
    worker: usize,
    prober: &dyn Prober,
    paths: &[String],
    job_rx: &Mutex<Receiver<usize>>,
    result_tx: &Sender<ProbeResult>,
    cancelled: &AtomicBool,
) {
    loop {
        if cancelled.load(Ordering::Relaxed) {
            debug!(worker, "Batch failed, worker stopping");
            break;
        }

        // Only hold the queue lock while claiming an index.
        let next = job_rx.lock().map(|rx| rx.recv()).unwrap_or_else(|e| e.into_inner().recv());
        let Ok(index) = next else {
            break;
        };

        let path = &paths[index];
        let title = track_title(path);
        let duration = prober.probe(path);

        if result_tx
            .send(ProbeResult {
                index,
                title,
                duration,
            })
            .is_err()
        {
            break;
        }
    }
}

/// Receives exactly one result per path, placing each by its index.
fn collect_results(paths: &[String], results: Receiver<ProbeResult>) -> Result<Vec<TrackMeta>, ProbeError> {
    let mut slots: Vec<Option<TrackMeta>> = vec![None; paths.len()];

    for _ in 0..paths.len() {
        let Ok(result) = results.recv() else {
            break;
        };

        match result.duration {
            Ok(duration) => {
                debug!(index = result.index, duration, "Probed track");
                slots[result.index] = Some(TrackMeta {
                    index: result.index,
                    path: paths[result.index].clone(),
                    title: result.title,
                    duration,
                });
            }
            Err(e) => {
                warn!(index = result.index, error = %e, "Probe failed, abandoning batch");
                return Err(e);
            }
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| ProbeError::ExecutionFailed {
                path: paths[index].clone(),
                reason: "no result from probe worker".to_string(),
            })
        })
        .collect()
}

/// Derives a track title from a path: the file name without its extension.
pub(crate) fn track_title(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
