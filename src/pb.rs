//! Generated protobuf/gRPC types for the syscall wire schema.

#![allow(clippy::all)]

tonic::include_proto!("syscall.v1");
