mod gc;
mod reserved;
mod snapshot;
