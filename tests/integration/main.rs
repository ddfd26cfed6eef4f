mod generation_lifecycle;
mod helpers;
mod viewport_flow;
