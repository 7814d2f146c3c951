// Copyright (c) Contributors to the Tenon project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/tenon-build/tenon

pub fn init_logging() {
    let sub = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::level_filters::LevelFilter::TRACE)
        .without_time()
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(sub);
}
