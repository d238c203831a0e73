const SPRITE_BASE: &str = "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

/// Front sprite for species `id`. The image may not exist for every id.
pub fn sprite_url(id: u32, shiny: bool) -> String {
    if shiny {
        format!("{SPRITE_BASE}/shiny/{id}.png")
    } else {
        format!("{SPRITE_BASE}/{id}.png")
    }
}
