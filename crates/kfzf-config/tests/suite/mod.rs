mod env;
mod loading;
mod store_section;
