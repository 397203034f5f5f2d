/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

mod chunk;
mod stream;
mod writer;

pub use chunk::FileChunkReader;
pub use stream::ProgressStream;
pub use writer::PositionedWriter;
