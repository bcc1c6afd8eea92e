// fn main not required
mod cors;

// all black-box tests live in a single binary: each tests/*.rs file would
// otherwise be linked separately, and linking is sequential
//
// every test spawns its own app (random port) and its own `MockServer`
// standing in for the upstream provider, so tests never talk to the real API
// and can run in parallel
