#![deny(warnings, clippy::all, clippy::pedantic)]

#[cfg(test)]
mod alloc;

#[cfg(test)]
mod exp;

#[cfg(test)]
pub(crate) static SERIALIZER: std::sync::Mutex<()> = std::sync::Mutex::new(());
