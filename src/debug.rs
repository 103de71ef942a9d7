impl std::fmt::Debug for crate::animal::Animal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(self.species().name())
            .field("age", &self.age())
            .field("weight", &format_args!("{:.2}", self.weight()))
            .field("fitness", &format_args!("{:.3}", self.fitness()))
            .field("dead", &self.is_dead())
            .field("migrated", &self.has_migrated())
            .finish()
    }
}

impl std::fmt::Debug for crate::landscape::Patch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(self.terrain.name())
            .field("fodder", &self.fodder)
            .field("herbivores", &self.herbivores)
            .field("carnivores", &self.carnivores)
            .finish()
    }
}

impl std::fmt::Debug for crate::island::Island {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Water is never inhabited, so leave it out
        f.debug_map()
            .entries(
                self.patches()
                    .filter(|(_, patch)| patch.terrain().is_passable()),
            )
            .finish()
    }
}
